use crate::{abi::EventRegistered, ChainReader, Error, RawLog, Result};
use alloy::primitives::{Address, Bytes, B256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{str::FromStr, time::Duration};
use tracing::{debug, warn};

/// raw log entry as returned by the explorer api
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    pub topics: Vec<String>,
    pub data: String,
    pub transaction_hash: String,
    pub block_number: String,
}

impl Default for LogEntry {
    fn default() -> Self {
        Self {
            topics: vec![],
            data: "0x".to_owned(),
            transaction_hash: String::new(),
            block_number: String::new(),
        }
    }
}

/// explorer log api response envelope
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LogResponse {
    pub status: String,
    pub message: String,
    pub result: Vec<LogEntry>,
}

/// indirect strategy through a block-explorer log-indexing api
pub struct Explorer {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    contract: Address,
}

impl Explorer {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        contract: Address,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
            contract,
        })
    }
}

#[async_trait]
impl ChainReader for Explorer {
    async fn fetch_logs(&self, from_block: u64) -> Result<Vec<RawLog>> {
        let mut query = vec![
            ("module", "logs".to_owned()),
            ("action", "getLogs".to_owned()),
            ("address", self.contract.to_string()),
            ("topic0", EventRegistered::SIGNATURE_HASH.to_string()),
            ("fromBlock", from_block.to_string()),
            ("toBlock", "latest".to_owned()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        let resp: LogResponse = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.status != "1" {
            // status "0" with an empty result means no matching records
            if resp.result.is_empty() {
                debug!(message = resp.message, "explorer returned no logs");
                return Ok(vec![]);
            }
            return Err(Error::Network(format!("explorer error: {}", resp.message)));
        }

        // a malformed entry is skipped, the rest of the batch still decodes
        Ok(resp
            .result
            .iter()
            .filter_map(|entry| match parse_entry(entry) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(error = e.to_string(), "skipping malformed explorer log");
                    None
                }
            })
            .collect())
    }
}

/// hex-decode one explorer log entry into a raw log
pub fn parse_entry(entry: &LogEntry) -> Result<RawLog> {
    let topics = entry
        .topics
        .iter()
        .map(|t| B256::from_str(t).map_err(|e| Error::Decode(format!("topic {:?}: {}", t, e))))
        .collect::<Result<Vec<_>>>()?;
    let data = Bytes::from_str(&entry.data)
        .map_err(|e| Error::Decode(format!("data {:?}: {}", entry.data, e)))?;
    let transaction_hash = B256::from_str(&entry.transaction_hash).ok();
    let block_number = parse_quantity(&entry.block_number);
    Ok(RawLog {
        topics,
        data,
        transaction_hash,
        block_number,
    })
}

// explorers return block numbers as 0x hex quantities, some as decimal
fn parse_quantity(s: &str) -> Option<u64> {
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use anyhow::Result;

    fn encoded_entry() -> LogEntry {
        let event = EventRegistered {
            eventId: U256::from(7u64),
            organizer: Address::repeat_byte(0xab),
            ticketContract: Address::repeat_byte(0x01),
            startTime: U256::from(1_700_000_000u64),
            endTime: U256::from(1_700_003_600u64),
        };
        let data = event.encode_log_data();
        LogEntry {
            topics: data.topics().iter().map(|t| t.to_string()).collect(),
            data: data.data.to_string(),
            transaction_hash: B256::repeat_byte(0x42).to_string(),
            block_number: "0xc".to_owned(),
        }
    }

    #[test]
    fn parse_and_decode_entry() -> Result<()> {
        let raw = parse_entry(&encoded_entry())?;
        assert_eq!(raw.block_number, Some(12));
        let record = raw.decode()?;
        assert_eq!(record.event_id, 7);
        assert_eq!(record.organizer, Address::repeat_byte(0xab));
        assert_eq!(record.transaction_hash, Some(B256::repeat_byte(0x42)));
        Ok(())
    }

    #[test]
    fn parse_rejects_bad_topic() {
        let mut entry = encoded_entry();
        entry.topics[1] = "0xnothex".to_owned();
        assert!(parse_entry(&entry).is_err());
    }

    #[test]
    fn response_envelope() -> Result<()> {
        let json = r#"{"status":"0","message":"No records found","result":[]}"#;
        let resp: LogResponse = serde_json::from_str(json)?;
        assert_eq!(resp.status, "0");
        assert!(resp.result.is_empty());

        let json = format!(
            r#"{{"status":"1","message":"OK","result":[{}]}}"#,
            serde_json::json!({
                "topics": encoded_entry().topics,
                "data": encoded_entry().data,
                "transactionHash": encoded_entry().transaction_hash,
                "blockNumber": "0x1",
            })
        );
        let resp: LogResponse = serde_json::from_str(&json)?;
        assert_eq!(resp.result.len(), 1);
        assert_eq!(parse_entry(&resp.result[0])?.decode()?.event_id, 7);
        Ok(())
    }
}
