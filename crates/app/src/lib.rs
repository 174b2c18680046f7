#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use stagesync_api::ApiState;
use stagesync_realtime::hub::{Hub, HubConfig};
use stagesync_storage::sqlite::migrate_with_pool;
use stagesync_storage::{HistoryRetention, SqliteStorage};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_DATABASE_URL: &str = "sqlite:data/dashboard.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub history_retention: HistoryRetention,
    pub max_connections: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var("LISTEN_ADDR").ok(),
            std::env::var("DATABASE_URL").ok(),
            std::env::var("HISTORY_KEEP_LAST").ok(),
            std::env::var("MAX_CONNECTIONS").ok(),
        )
    }

    fn from_values(
        listen_addr: Option<String>,
        database_url: Option<String>,
        history_keep_last: Option<String>,
        max_connections: Option<String>,
    ) -> anyhow::Result<Self> {
        let listen_addr =
            SocketAddr::from_str(listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR))?;
        let database_url = database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let history_retention = match history_keep_last {
            Some(raw) => {
                let keep = raw
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("invalid HISTORY_KEEP_LAST {raw:?}"))?;
                HistoryRetention::KeepLast(keep)
            }
            None => HistoryRetention::Unbounded,
        };
        let max_connections = match max_connections {
            Some(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| anyhow::anyhow!("invalid MAX_CONNECTIONS {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            listen_addr,
            database_url,
            history_retention,
            max_connections,
        })
    }
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let storage = SqliteStorage::connect(&config.database_url)
        .await?
        .with_history_retention(config.history_retention);
    migrate_with_pool(storage.pool()).await?;

    let mut hub_config = HubConfig::default();
    if let Some(max_connections) = config.max_connections {
        hub_config.max_connections = max_connections;
    }
    let hub = Arc::new(Hub::new(hub_config));
    let api_state = ApiState::new(Arc::new(storage), hub);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");
    axum::serve(listener, stagesync_api::router(api_state)).await?;
    Ok(())
}
