use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(crate) u64);

/// One connected session's delivery endpoint. `send` must not block; a
/// `false` return marks the subscriber as stale and the hub evicts it.
pub trait Subscriber: Send + Sync {
    fn send(&self, payload: Arc<str>) -> bool;
    /// Stable per-connection id used to exclude the sender from its own
    /// change notifications.
    fn exclude_id(&self) -> &str;
    fn is_closed(&self) -> bool;
}
