//! metadata resolver: registry pointer lookup plus content gateway fetch.
//! every failure here is soft, callers substitute defaults.

use crate::{abi::MetadataRegistry, fallback};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::ProviderBuilder;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// entity discriminant used by the registry contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntityKind {
    Event = 0,
    Poap = 1,
    Badge = 2,
}

/// content pointer stored in the registry, written once by the off-chain
/// uploader and optionally frozen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPointer {
    pub ipfs_hash: String,
    pub content_hash: B256,
    pub frozen: bool,
}

/// descriptive fields fetched from the content-addressed store
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventMetadata {
    pub name: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

pub struct MetadataResolver {
    registry: Option<(Url, Address)>,
    gateways: Vec<String>,
    per_attempt: Duration,
    client: Client,
}

impl MetadataResolver {
    pub fn new(registry: Option<(Url, Address)>, gateways: Vec<String>, per_attempt: Duration) -> Self {
        Self {
            registry,
            gateways,
            per_attempt,
            client: Client::new(),
        }
    }

    /// look up the content pointer for an entity, `None` when the registry
    /// is unconfigured, unreachable or holds no entry
    pub async fn pointer(&self, kind: EntityKind, id: u64) -> Option<MetadataPointer> {
        let (url, address) = self.registry.as_ref()?;
        let provider = ProviderBuilder::new().connect_http(url.clone());
        let registry = MetadataRegistry::new(*address, &provider);
        let call = registry.getMetadata(kind as u8, U256::from(id));
        let entry = match tokio::time::timeout(self.per_attempt, call.call()).await {
            Ok(Ok(entry)) => entry,
            Ok(Err(e)) => {
                debug!(id, error = e.to_string(), "registry lookup failed");
                return None;
            }
            Err(_) => {
                debug!(id, "registry lookup timed out");
                return None;
            }
        };
        if entry.ipfsHash.is_empty() {
            return None;
        }
        Some(MetadataPointer {
            ipfs_hash: entry.ipfsHash,
            content_hash: entry.contentHash,
            frozen: entry.frozen,
        })
    }

    /// fetch a json document by content hash, trying the gateways in order
    pub async fn fetch_json(&self, hash: &str) -> Option<Value> {
        let client = self.client.clone();
        fallback::first_ok(self.gateways.iter(), self.per_attempt, |gateway| {
            let url = format!("{}/ipfs/{}", gateway.trim_end_matches('/'), hash);
            let client = client.clone();
            async move {
                let resp = client.get(&url).send().await?.error_for_status()?;
                resp.json::<Value>().await
            }
        })
        .await
    }

    /// resolve descriptive fields for an event id; `None` means "no metadata"
    pub async fn resolve_event(&self, id: u64) -> Option<EventMetadata> {
        let pointer = self.pointer(EntityKind::Event, id).await?;
        let doc = self.fetch_json(&pointer.ipfs_hash).await?;
        serde_json::from_value(doc).ok()
    }
}
