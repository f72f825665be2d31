use crate::{abi::EventRegistered, Error, Result};
use alloy::primitives::{Address, Bytes, LogData, B256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;

/// one raw log entry as returned by a node or an explorer, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub transaction_hash: Option<B256>,
    pub block_number: Option<u64>,
}

/// a decoded `EventRegistered` record. immutable once observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event_id: u64,
    pub organizer: Address,
    pub ticket_contract: Address,
    pub start_time: u64,
    pub end_time: u64,
    pub transaction_hash: Option<B256>,
    pub block_number: Option<u64>,
}

/// the chain reader trait for multiple log sources
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// fetch raw `EventRegistered` logs from `from_block` to the latest
    /// block, in chain log order
    async fn fetch_logs(&self, from_block: u64) -> Result<Vec<RawLog>>;
}

impl RawLog {
    /// decode against the `EventRegistered` fragment.
    /// a failure here is local to this record.
    pub fn decode(&self) -> Result<EventRecord> {
        let data = LogData::new(self.topics.clone(), self.data.clone())
            .ok_or_else(|| Error::Decode("too many topics".to_owned()))?;
        let decoded =
            EventRegistered::decode_log_data(&data).map_err(|e| Error::Decode(e.to_string()))?;
        let event_id: u64 = decoded
            .eventId
            .try_into()
            .map_err(|_| Error::Decode("event id out of range".to_owned()))?;
        Ok(EventRecord {
            event_id,
            organizer: decoded.organizer,
            ticket_contract: decoded.ticketContract,
            start_time: decoded.startTime.try_into().unwrap_or(0),
            end_time: decoded.endTime.try_into().unwrap_or(0),
            transaction_hash: self.transaction_hash,
            block_number: self.block_number,
        })
    }
}
