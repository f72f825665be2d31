// reconciliation pass properties driven by a canned log source

use alloy::{
    primitives::{Address, B256, U256},
    sol_types::SolEvent,
};
use anyhow::Result;
use async_trait::async_trait;
use chain_client::{abi::EventRegistered, ChainReader, RawLog};
use std::collections::BTreeSet;
use ticketbox::{setting, sync};
use util::create_test_state;

mod util;

struct StaticReader {
    logs: Vec<RawLog>,
}

#[async_trait]
impl ChainReader for StaticReader {
    async fn fetch_logs(&self, _from_block: u64) -> chain_client::Result<Vec<RawLog>> {
        Ok(self.logs.clone())
    }
}

fn registered_log(event_id: u64, organizer: Address, start_time: u64) -> RawLog {
    let event = EventRegistered {
        eventId: U256::from(event_id),
        organizer,
        ticketContract: Address::repeat_byte(0x01),
        startTime: U256::from(start_time),
        endTime: U256::from(start_time + 3_600),
    };
    let data = event.encode_log_data();
    RawLog {
        topics: data.topics().to_vec(),
        data: data.data.clone(),
        transaction_hash: Some(B256::repeat_byte(0x42)),
        block_number: Some(1),
    }
}

#[tokio::test]
async fn single_pass_inserts_record() -> Result<()> {
    let state = create_test_state().await?;
    let chain = setting::Chain::default();
    let organizer = Address::repeat_byte(0xab);
    let reader = StaticReader {
        logs: vec![registered_log(7, organizer, 1_700_000_000)],
    };

    let report = sync::sync_once(&state.service, &reader, None, &chain).await?;
    assert_eq!(report.fetched, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(report.failed, 0);

    let row = state.service.get_event_by_chain_id(7).await?.unwrap();
    assert_eq!(row.blockchain_event_id, Some(7));
    assert_eq!(row.creator_address, Some(organizer.to_string()));
    assert_eq!(row.event_date, "2023-11-14T22:13:20Z");
    assert_eq!(state.service.list_events().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn second_pass_is_idempotent() -> Result<()> {
    let state = create_test_state().await?;
    let chain = setting::Chain::default();
    let reader = StaticReader {
        logs: vec![
            registered_log(1, Address::repeat_byte(0xaa), 1_700_000_000),
            registered_log(2, Address::repeat_byte(0xbb), 1_700_100_000),
        ],
    };

    let first = sync::sync_once(&state.service, &reader, None, &chain).await?;
    assert_eq!(first.inserted, 2);

    // unchanged chain state, no additional rows
    let second = sync::sync_once(&state.service, &reader, None, &chain).await?;
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 2);

    let events = state.service.list_events().await?;
    assert_eq!(events.len(), 2);
    let ids: BTreeSet<_> = events.iter().map(|e| e.blockchain_event_id).collect();
    assert_eq!(ids.len(), events.len());
    Ok(())
}

#[tokio::test]
async fn malformed_record_is_isolated() -> Result<()> {
    let state = create_test_state().await?;
    let chain = setting::Chain::default();

    let mut bad = registered_log(2, Address::repeat_byte(0xbb), 1_700_100_000);
    bad.topics.truncate(1); // indexed params gone, decoding must fail

    let reader = StaticReader {
        logs: vec![
            registered_log(1, Address::repeat_byte(0xaa), 1_700_000_000),
            bad,
            registered_log(3, Address::repeat_byte(0xcc), 1_700_200_000),
        ],
    };

    let report = sync::sync_once(&state.service, &reader, None, &chain).await?;
    assert_eq!(report.fetched, 3);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 1);

    assert!(state.service.get_event_by_chain_id(1).await?.is_some());
    assert!(state.service.get_event_by_chain_id(2).await?.is_none());
    assert!(state.service.get_event_by_chain_id(3).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn held_slot_skips_pass() -> Result<()> {
    let state = create_test_state().await?;
    let chain = setting::Chain::default();
    let reader = StaticReader {
        logs: vec![registered_log(9, Address::repeat_byte(0xee), 1_700_000_000)],
    };

    // while a pass holds the slot, a concurrent trigger must not run
    let guard = state.sync_lock.lock().await;
    let busy = sync::try_sync(&state.sync_lock, &state.service, &reader, None, &chain).await?;
    assert!(busy.is_none());
    assert!(state.service.list_events().await?.is_empty());
    drop(guard);

    let report = sync::try_sync(&state.sync_lock, &state.service, &reader, None, &chain)
        .await?
        .unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(state.service.list_events().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_metadata_uses_defaults() -> Result<()> {
    let state = create_test_state().await?;
    let chain = setting::Chain::default();
    let reader = StaticReader {
        logs: vec![registered_log(42, Address::repeat_byte(0xdd), 1_700_000_000)],
    };

    sync::sync_once(&state.service, &reader, None, &chain).await?;

    let row = state.service.get_event_by_chain_id(42).await?.unwrap();
    assert_eq!(row.event_name, "Event #42");
    assert_eq!(row.venue, chain.placeholder_venue);
    assert!(row.flyer_image.is_none());
    Ok(())
}
