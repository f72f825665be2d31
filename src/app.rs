use crate::{
    api,
    setting::{Setting, Strategy},
    sync, Result, Service,
};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest},
    middleware, web, App as WebApp, HttpServer,
};
use chain_client::{parse_address, ChainReader, Explorer, MetadataResolver, Rpc};
use sea_orm::{ConnectOptions, Database};
use std::{path::Path, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, warn};

pub struct AppState {
    pub service: Service,
    pub setting: Setting,
    /// gateway-only resolver backing the metadata fetch api
    pub resolver: MetadataResolver,
    /// single-slot guard, two reconciliation passes never interleave
    pub sync_lock: Mutex<()>,
}

impl AppState {
    pub async fn create<P: AsRef<Path>>(
        setting_path: Option<P>,
        setting_env_prefix: Option<String>,
    ) -> Result<Self> {
        let env_notice = setting_env_prefix
            .as_ref()
            .map(|s| {
                format!(
                    ", config will be overrided by ENV seting with prefix `{}_`",
                    s
                )
            })
            .unwrap_or_default();

        let setting = if let Some(path) = setting_path {
            info!("Load config {:?}{}", path.as_ref(), env_notice);
            Setting::read(path.as_ref(), setting_env_prefix)?
        } else if let Some(prefix) = setting_env_prefix {
            info!("Load default config{}", env_notice);
            Setting::from_env(prefix)?
        } else {
            info!("Load default config");
            Setting::default()
        };

        info!("{:?}", setting);

        Self::from_setting(setting).await
    }

    pub async fn from_setting(setting: Setting) -> Result<Self> {
        let mut options = ConnectOptions::from(&setting.db_url);
        options.sqlx_logging_level(tracing::log::LevelFilter::Trace);
        let conn = Database::connect(options).await?;
        let service = Service::new(conn);
        let resolver = MetadataResolver::new(
            None,
            setting.ipfs.gateways.clone(),
            Duration::from_secs(setting.ipfs.timeout),
        );

        Ok(Self {
            service,
            setting,
            resolver,
            sync_lock: Mutex::new(()),
        })
    }
}

pub fn create_web_app(
    data: web::Data<AppState>,
) -> WebApp<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    WebApp::new()
        .app_data(data)
        // flyer images arrive base64-encoded in the json body
        .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
        .wrap(middleware::Logger::default()) // enable logger
        .wrap(
            Cors::default()
                .send_wildcard()
                .allow_any_header()
                .allow_any_origin()
                .allow_any_method()
                .max_age(86_400),
        )
        .service(api::health)
        .service(api::events_scope())
        .service(api::metadata_scope())
}

async fn build_reader(chain: &crate::setting::Chain) -> Result<Box<dyn ChainReader>> {
    let contract = parse_address(&chain.event_manager)?;
    let timeout = Duration::from_secs(chain.timeout);
    Ok(match chain.strategy {
        Strategy::Rpc => Box::new(Rpc::connect(&chain.rpc_urls, timeout, contract).await?),
        Strategy::Explorer => Box::new(Explorer::new(
            chain.explorer_url.clone(),
            chain.explorer_api_key.clone(),
            contract,
            timeout,
        )?),
    })
}

async fn build_resolver(setting: &Setting) -> MetadataResolver {
    let timeout = Duration::from_secs(setting.chain.timeout);
    let registry = match &setting.chain.metadata_registry {
        Some(addr) => match parse_address(addr) {
            Ok(address) => {
                match chain_client::rpc::select_endpoint(&setting.chain.rpc_urls, timeout).await {
                    Some(url) => Some((url, address)),
                    None => {
                        warn!("no live rpc endpoint for metadata registry");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = e.to_string(), "invalid metadata registry address");
                None
            }
        },
        None => None,
    };
    MetadataResolver::new(
        registry,
        setting.ipfs.gateways.clone(),
        Duration::from_secs(setting.ipfs.timeout),
    )
}

/// start the chain sync task mirroring on-chain registrations into the
/// local store. never gates http startup; the returned handle is the
/// host's cancellation path.
pub fn start_chain_sync(state: web::Data<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let chain = state.setting.chain.clone();
        let reader = match build_reader(&chain).await {
            Ok(reader) => reader,
            Err(e) => {
                error!(error = e.to_string(), "chain sync disabled, no log source");
                return;
            }
        };
        let resolver = build_resolver(&state.setting).await;

        loop {
            match sync::try_sync(
                &state.sync_lock,
                &state.service,
                reader.as_ref(),
                Some(&resolver),
                &chain,
            )
            .await
            {
                Ok(Some(report)) => info!(?report, "chain sync complete"),
                Ok(None) => warn!("chain sync already in progress, skipping pass"),
                Err(e) => error!(error = e.to_string(), "chain sync failed"),
            }
            if chain.sync_interval == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_secs(chain.sync_interval)).await;
        }
    })
}

/// start app and tasks
pub async fn start(state: AppState) -> Result<()> {
    let state = web::Data::new(state);

    let sync_handle = if state.setting.chain.enabled {
        Some(start_chain_sync(state.clone()))
    } else {
        info!("chain sync disabled");
        None
    };

    let c_data = state.clone();
    let server = HttpServer::new(move || create_web_app(c_data.clone()));
    let num = if state.setting.thread.http == 0 {
        num_cpus::get()
    } else {
        state.setting.thread.http
    };
    let host = state.setting.network.host.clone();
    let port = state.setting.network.port;
    info!("Start http server {}:{}", host, port);
    server.workers(num).bind((host, port))?.run().await?;

    if let Some(handle) = sync_handle {
        handle.abort();
    }
    Ok(())
}
