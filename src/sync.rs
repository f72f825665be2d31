//! reconciliation pass: merge observed `EventRegistered` records into the
//! local events table, keyed by the unique on-chain event id.

use crate::{service::EventDraft, setting, Result, Service};
use chain_client::{ChainReader, EventRecord, MetadataResolver};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, warn};

/// counters for one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// run one pass behind the single-slot guard. `None` means another pass
/// holds the slot; two passes never interleave.
pub async fn try_sync(
    lock: &Mutex<()>,
    service: &Service,
    reader: &dyn ChainReader,
    resolver: Option<&MetadataResolver>,
    chain: &setting::Chain,
) -> Result<Option<SyncReport>> {
    match lock.try_lock() {
        Ok(_guard) => Ok(Some(sync_once(service, reader, resolver, chain).await?)),
        Err(_) => Ok(None),
    }
}

/// run one pass. infra failures (no reachable log source) abort the pass;
/// a decode or insert failure on one record never blocks its siblings.
pub async fn sync_once(
    service: &Service,
    reader: &dyn ChainReader,
    resolver: Option<&MetadataResolver>,
    chain: &setting::Chain,
) -> Result<SyncReport> {
    let logs = reader.fetch_logs(chain.from_block).await?;
    let mut report = SyncReport {
        fetched: logs.len(),
        ..Default::default()
    };

    for raw in &logs {
        let record = match raw.decode() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = e.to_string(), "skipping undecodable log");
                report.failed += 1;
                continue;
            }
        };
        match reconcile(service, resolver, chain, &record).await {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                error!(
                    event_id = record.event_id,
                    error = e.to_string(),
                    "failed to reconcile event"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// insert a single record unless its chain id is already present.
/// returns true when a row was inserted.
async fn reconcile(
    service: &Service,
    resolver: Option<&MetadataResolver>,
    chain: &setting::Chain,
    record: &EventRecord,
) -> Result<bool> {
    if service
        .get_event_by_chain_id(record.event_id)
        .await?
        .is_some()
    {
        return Ok(false);
    }

    // absent metadata is a soft condition, fall back to defaults
    let meta = match resolver {
        Some(resolver) => resolver.resolve_event(record.event_id).await,
        None => None,
    }
    .unwrap_or_default();

    let draft = EventDraft {
        event_name: meta
            .name
            .unwrap_or_else(|| format!("Event #{}", record.event_id)),
        event_date: iso8601(record.start_time),
        venue: meta
            .location
            .unwrap_or_else(|| chain.placeholder_venue.clone()),
        flyer_image: meta.image,
        creator_address: Some(record.organizer.to_string()),
        blockchain_event_id: Some(record.event_id as i64),
        blockchain_tx_hash: record.transaction_hash.map(|h| h.to_string()),
        ..Default::default()
    };
    service.create_event(draft).await?;
    Ok(true)
}

fn iso8601(ts: u64) -> String {
    OffsetDateTime::from_unix_timestamp(ts as i64)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_default()
}
