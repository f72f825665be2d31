//! abi fragments for the event manager and metadata registry contracts

use alloy::sol;

sol! {
    /// emitted by the event manager when an event is registered on chain
    #[derive(Debug)]
    event EventRegistered(
        uint256 indexed eventId,
        address indexed organizer,
        address ticketContract,
        uint256 startTime,
        uint256 endTime
    );
}

sol! {
    #[sol(rpc)]
    interface MetadataRegistry {
        struct Entry {
            string ipfsHash;
            bytes32 contentHash;
            uint256 timestamp;
            address updatedBy;
            bool frozen;
        }

        function getMetadata(uint8 entityType, uint256 entityId) external view returns (Entry memory);
    }
}
