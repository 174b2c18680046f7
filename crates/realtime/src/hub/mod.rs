mod config;
mod error;
mod registry;
mod subscriber;

pub use config::HubConfig;
pub use error::HubError;
pub use registry::Hub;
pub use subscriber::{Subscriber, SubscriberId};
