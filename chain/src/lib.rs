use alloy::primitives::Address;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("network: {0}")]
    Network(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Rpc(#[from] alloy::transports::TransportError),
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

pub mod abi;

pub mod fallback;

pub mod reader;
pub use reader::{ChainReader, EventRecord, RawLog};

pub mod rpc;
pub use rpc::Rpc;

pub mod explorer;
pub use explorer::Explorer;

pub mod metadata;
pub use metadata::{EntityKind, EventMetadata, MetadataPointer, MetadataResolver};

/// parse a `0x` hex contract address
pub fn parse_address(s: &str) -> Result<Address> {
    s.parse()
        .map_err(|e| Error::Decode(format!("invalid address {:?}: {}", s, e)))
}
