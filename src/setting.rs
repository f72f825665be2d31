use crate::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CARGO_PKG_VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// number of threads config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Thread {
    /// number of http server threads
    pub http: usize,
}

/// network config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Network {
    /// server bind host
    pub host: String,
    /// server bind port
    pub port: u16,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// chain reader strategy
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// direct node rpc log query
    Rpc,
    /// block-explorer log-indexing api
    Explorer,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Explorer
    }
}

/// chain sync config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Chain {
    pub strategy: Strategy,

    /// ordered rpc endpoints, the first live one wins
    pub rpc_urls: Vec<String>,

    /// block explorer log api
    pub explorer_url: String,
    pub explorer_api_key: Option<String>,

    /// event manager contract emitting `EventRegistered`
    pub event_manager: String,
    /// metadata registry contract
    pub metadata_registry: Option<String>,

    pub from_block: u64,

    /// per-attempt network timeout in seconds
    pub timeout: u64,

    /// seconds between passes, 0 runs a single pass at startup
    pub sync_interval: u64,

    /// venue used when an event has no resolvable metadata
    pub placeholder_venue: String,

    /// disable the sync task entirely
    pub enabled: bool,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            strategy: Default::default(),
            rpc_urls: vec![
                "https://api.avax-test.network/ext/bc/C/rpc".to_owned(),
                "https://avalanche-fuji-c-chain-rpc.publicnode.com".to_owned(),
                "https://rpc.ankr.com/avalanche_fuji".to_owned(),
            ],
            explorer_url: "https://api-testnet.snowtrace.io/api".to_owned(),
            explorer_api_key: None,
            event_manager: "0x1651f730a846eD23411180eC71C9eFbFCD05A871".to_owned(),
            metadata_registry: Some("0xB8F60EAf784b897F7b7AFDabdc67aC6E69fA953b".to_owned()),
            from_block: 0,
            timeout: 5,
            sync_interval: 0,
            placeholder_venue: "Blockchain Event".to_owned(),
            enabled: true,
        }
    }
}

/// ipfs gateway and pinning config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Ipfs {
    /// ordered gateway mirrors, `{gateway}/ipfs/{hash}`
    pub gateways: Vec<String>,

    /// per-gateway timeout in seconds
    pub timeout: u64,

    pub pinata_endpoint: String,
    /// pinning is disabled when unset
    pub pinata_jwt: Option<String>,
}

impl Default for Ipfs {
    fn default() -> Self {
        Self {
            gateways: vec![
                "https://gateway.pinata.cloud".to_owned(),
                "https://ipfs.io".to_owned(),
                "https://cloudflare-ipfs.com".to_owned(),
            ],
            timeout: 5,
            pinata_endpoint: "https://api.pinata.cloud".to_owned(),
            pinata_jwt: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Setting {
    /// database url
    /// https://www.sea-ql.org/SeaORM/docs/install-and-config/connection/
    pub db_url: String,

    /// the site url
    pub site: Option<String>,

    pub thread: Thread,
    pub network: Network,

    pub chain: Chain,
    pub ipfs: Ipfs,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            db_url: "sqlite://ticketbox.sqlite".to_string(),
            site: None,
            thread: Default::default(),
            network: Default::default(),
            chain: Default::default(),
            ipfs: Default::default(),
        }
    }
}

impl Setting {
    /// read config from file and env
    pub fn read<P: AsRef<Path>>(file: P, env_prefix: Option<String>) -> Result<Self> {
        let builder = Config::builder();
        let mut config = builder
            // Use serde default feature
            // override with file contents
            .add_source(File::with_name(file.as_ref().to_str().unwrap_or_default()));
        if let Some(prefix) = env_prefix {
            config = config.add_source(Self::env_source(&prefix));
        }

        let config = config.build()?;
        let setting: Setting = config.try_deserialize()?;
        Ok(setting)
    }

    fn env_source(prefix: &str) -> Environment {
        Environment::with_prefix(prefix)
            .try_parsing(true)
            .prefix_separator("_")
            .separator("__")
            .list_separator(" ")
            .with_list_parse_key("chain.rpc_urls")
            .with_list_parse_key("ipfs.gateways")
    }

    /// read config from env
    pub fn from_env(env_prefix: String) -> Result<Self> {
        let mut config = Config::builder();
        config = config.add_source(Self::env_source(&env_prefix));

        let config = config.build()?;
        let setting: Setting = config.try_deserialize()?;
        Ok(setting)
    }

    /// config from str
    pub fn from_str(s: &str, format: FileFormat) -> Result<Self> {
        let builder = Config::builder();
        let config = builder.add_source(File::from_str(s, format)).build()?;
        let setting: Setting = config.try_deserialize()?;
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use config::FileFormat;
    use std::fs;
    use tempfile::Builder;

    #[test]
    fn der() -> Result<()> {
        let json = r#"{
            "chain": {"strategy": "rpc", "sync_interval": 60},
            "network": {"port": 1},
            "thread": {"http": 1}
        }"#;

        let mut def = Setting::default();
        def.network.port = 1;
        def.thread.http = 1;
        def.chain.strategy = Strategy::Rpc;
        def.chain.sync_interval = 60;

        let s2 = serde_json::from_str::<Setting>(json)?;
        let s1: Setting = Setting::from_str(json, FileFormat::Json)?;

        assert_eq!(def, s1);
        assert_eq!(def, s2);

        Ok(())
    }

    #[test]
    fn defaults() {
        let setting = Setting::default();
        assert_eq!(setting.chain.strategy, Strategy::Explorer);
        assert_eq!(setting.chain.rpc_urls.len(), 3);
        assert!(setting.ipfs.gateways.len() >= 3);
        assert_eq!(setting.chain.placeholder_venue, "Blockchain Event");
    }

    #[test]
    fn read() -> Result<()> {
        let setting = Setting::default();
        assert_eq!(setting.network.host, "127.0.0.1");

        let file = Builder::new()
            .prefix("ticketbox-config-test-read")
            .suffix(".toml")
            .rand_bytes(0)
            .tempfile()?;

        let setting = Setting::read(&file, None)?;
        assert_eq!(setting.network.host, "127.0.0.1");
        fs::write(
            &file,
            r#"
        [network]
        host = "127.0.0.2"
        "#,
        )?;

        temp_env::with_vars(
            [
                ("TB_network.port", Some("1")),
                ("TB_network__host", Some("127.0.0.3")),
                ("TB_chain__sync_interval", Some("30")),
            ],
            || {
                let setting = Setting::read(&file, Some("TB".to_owned())).unwrap();
                assert_eq!(setting.network.host, "127.0.0.3".to_string());
                assert_eq!(setting.network.port, 1);
                assert_eq!(setting.chain.sync_interval, 30);
            },
        );
        Ok(())
    }
}
