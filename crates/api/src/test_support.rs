use std::net::SocketAddr;
use std::sync::Arc;

use stagesync_realtime::hub::{Hub, HubConfig};
use stagesync_storage::sqlite::migrate_with_pool;
use stagesync_storage::SqliteStorage;
use tokio::task::JoinHandle;

use crate::{router, ApiState};

pub(crate) struct TestServer {
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
    pub http: reqwest::Client,
    pub storage: Arc<SqliteStorage>,
}

impl TestServer {
    pub(crate) fn data_url(&self, key: &str) -> String {
        format!("http://{}/api/data/{key}", self.addr)
    }

    pub(crate) fn history_url(&self, key: &str) -> String {
        format!("http://{}/api/history/{key}", self.addr)
    }

    pub(crate) fn ws_url(&self) -> String {
        format!("ws://{}/api/v1/ws", self.addr)
    }
}

pub(crate) async fn spawn_server() -> TestServer {
    spawn_server_with_hub_config(HubConfig::default()).await
}

pub(crate) async fn spawn_server_with_hub_config(config: HubConfig) -> TestServer {
    let storage = Arc::new(
        SqliteStorage::connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite"),
    );
    migrate_with_pool(storage.pool()).await.expect("migrate");

    let hub = Arc::new(Hub::new(config));
    let app = router(ApiState::new(storage.clone(), hub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });

    TestServer {
        addr,
        handle,
        http: reqwest::Client::new(),
        storage,
    }
}
