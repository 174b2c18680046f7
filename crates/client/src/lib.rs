#![forbid(unsafe_code)]

//! Client-side state reconciliation for the shared dashboard.
//!
//! A session seeds an in-memory projection of the keys its view cares about
//! with a bulk fetch, keeps it live by applying change notifications from
//! the gateway's broadcast channel, and pushes local edits through the
//! durable request path. There is no replay on reconnect: `resync` re-runs
//! the seed fetch, which is the only catch-up mechanism.

mod data;
mod history;
mod projection;
mod reconciler;
mod socket;

pub use data::DataApi;
pub use history::HistoryApi;
pub use projection::{Projection, ViewScope};
pub use reconciler::{DashboardLayout, Reconciler};
pub use socket::EventSocket;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("server negotiated unexpected subprotocol {0:?}")]
    UnexpectedSubprotocol(Option<String>),
    #[error("connection closed during handshake")]
    Closed,
    #[error("protocol error: {0}")]
    Protocol(String),
}
