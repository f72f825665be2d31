use crate::{abi::EventRegistered, fallback, ChainReader, Error, RawLog, Result};
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, Filter};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// probe endpoints in order, keeping the first one that answers a block
/// height query within the timeout
pub async fn select_endpoint(urls: &[String], per_attempt: Duration) -> Option<Url> {
    fallback::first_ok(urls.iter(), per_attempt, |u| async move {
        let url: Url = u.parse()?;
        let provider = ProviderBuilder::new().connect_http(url.clone());
        let height = provider.get_block_number().await?;
        debug!(endpoint = %url, height, "selected rpc endpoint");
        Ok::<_, Error>(url)
    })
    .await
}

/// direct node connection strategy
pub struct Rpc {
    url: Url,
    contract: Address,
}

impl Rpc {
    /// probe the configured endpoints and connect to the first live one
    pub async fn connect(urls: &[String], per_attempt: Duration, contract: Address) -> Result<Self> {
        let url = select_endpoint(urls, per_attempt)
            .await
            .ok_or_else(|| Error::Network("all rpc endpoints failed".to_owned()))?;
        Ok(Self { url, contract })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    // providers are stateless, a fresh one per operation
    fn provider(&self) -> impl Provider {
        ProviderBuilder::new().connect_http(self.url.clone())
    }
}

#[async_trait]
impl ChainReader for Rpc {
    async fn fetch_logs(&self, from_block: u64) -> Result<Vec<RawLog>> {
        let filter = Filter::new()
            .address(self.contract)
            .event_signature(EventRegistered::SIGNATURE_HASH)
            .from_block(from_block)
            .to_block(BlockNumberOrTag::Latest);
        let logs = self.provider().get_logs(&filter).await?;
        Ok(logs
            .into_iter()
            .map(|log| RawLog {
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
                transaction_hash: log.transaction_hash,
                block_number: log.block_number,
            })
            .collect())
    }
}
