#![forbid(unsafe_code)]

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use stagesync_realtime::hub::Hub;
use stagesync_storage::Store;

mod commit;
mod data;
mod history;
mod ws;

#[cfg(test)]
mod test_support;

/// Header a client sets on request-path writes to name its own WebSocket
/// session, so the resulting change notification skips it.
pub const X_CONNECTION_ID: &str = "x-connection-id";

#[derive(Clone)]
pub struct ApiState {
    storage: Arc<dyn Store>,
    hub: Arc<Hub>,
}

impl ApiState {
    #[must_use]
    pub fn new(storage: Arc<dyn Store>, hub: Arc<Hub>) -> Self {
        Self { storage, hub }
    }

    pub(crate) fn storage(&self) -> &dyn Store {
        self.storage.as_ref()
    }

    pub(crate) fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/data/{key}",
            get(data::get_value)
                .put(data::put_value)
                .delete(data::delete_value),
        )
        .route(
            "/api/history/{key}",
            get(history::get_history).post(history::post_history),
        )
        .route("/api/v1/ws", get(ws::websocket_upgrade))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> StatusCode {
    match state.storage.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
