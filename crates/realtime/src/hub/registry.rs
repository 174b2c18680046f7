use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::hub::{HubConfig, HubError, Subscriber, SubscriberId};

/// Registry of every connected session and the fan-out over them.
///
/// There is a single shared room: the dashboard has no partitioning model,
/// every session sees every change notification except its own.
pub struct Hub {
    config: HubConfig,
    next_subscriber_id: AtomicU64,
    state: RwLock<HubState>,
}

impl Hub {
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            next_subscriber_id: AtomicU64::new(1),
            state: RwLock::new(HubState {
                subscribers: HashMap::new(),
            }),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.subscribers.len()
    }

    pub async fn register(&self, subscriber: Arc<dyn Subscriber>) -> Result<SubscriberId, HubError> {
        let mut state = self.state.write().await;
        if state.subscribers.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections);
        }

        let subscriber_id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        state.subscribers.insert(subscriber_id, subscriber);
        Ok(subscriber_id)
    }

    pub async fn unregister(&self, subscriber_id: SubscriberId) -> Result<(), HubError> {
        let mut state = self.state.write().await;
        if state.subscribers.remove(&subscriber_id).is_some() {
            Ok(())
        } else {
            Err(HubError::SubscriberNotFound)
        }
    }

    /// Delivers `payload` to every registered session except the one whose
    /// `exclude_id` matches. Closed or slow subscribers are evicted instead
    /// of delivered to. Returns the delivered count.
    pub async fn broadcast(&self, exclude_id: &str, payload: &str) -> usize {
        let recipients = {
            let state = self.state.read().await;
            state
                .subscribers
                .iter()
                .map(|(subscriber_id, subscriber)| (*subscriber_id, Arc::clone(subscriber)))
                .collect::<Vec<_>>()
        };

        if recipients.is_empty() {
            return 0;
        }

        let shared_payload = Arc::<str>::from(payload);
        let mut delivered_count = 0;
        let mut stale_subscribers = Vec::new();

        for (subscriber_id, subscriber) in recipients {
            if subscriber.is_closed() {
                stale_subscribers.push(subscriber_id);
                continue;
            }
            if subscriber.exclude_id() == exclude_id {
                continue;
            }
            if subscriber.send(Arc::clone(&shared_payload)) {
                delivered_count += 1;
            } else {
                stale_subscribers.push(subscriber_id);
            }
        }

        if !stale_subscribers.is_empty() {
            let mut state = self.state.write().await;
            for subscriber_id in stale_subscribers {
                state.subscribers.remove(&subscriber_id);
            }
        }

        delivered_count
    }
}

struct HubState {
    subscribers: HashMap<SubscriberId, Arc<dyn Subscriber>>,
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::Hub;
    use crate::hub::{HubConfig, HubError, Subscriber};

    struct MockSubscriber {
        exclude_id: String,
        closed: AtomicBool,
        send_ok: AtomicBool,
        inbox: Mutex<Vec<String>>,
    }

    impl MockSubscriber {
        fn new(exclude_id: &str) -> Self {
            Self {
                exclude_id: exclude_id.to_owned(),
                closed: AtomicBool::new(false),
                send_ok: AtomicBool::new(true),
                inbox: Mutex::new(Vec::new()),
            }
        }

        fn received(&self) -> Vec<String> {
            self.inbox.lock().expect("lock inbox").clone()
        }

        fn set_closed(&self, value: bool) {
            self.closed.store(value, Ordering::Relaxed);
        }

        fn set_send_ok(&self, value: bool) {
            self.send_ok.store(value, Ordering::Relaxed);
        }
    }

    impl Subscriber for MockSubscriber {
        fn send(&self, payload: Arc<str>) -> bool {
            if !self.send_ok.load(Ordering::Relaxed) {
                return false;
            }
            self.inbox
                .lock()
                .expect("lock inbox")
                .push(payload.to_string());
            true
        }

        fn exclude_id(&self) -> &str {
            &self.exclude_id
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::Relaxed)
        }
    }

    #[tokio::test]
    async fn broadcast_excludes_the_sender() {
        let hub = Hub::new(HubConfig::default());
        let sender = Arc::new(MockSubscriber::new("conn-a"));
        let peer_b = Arc::new(MockSubscriber::new("conn-b"));
        let peer_c = Arc::new(MockSubscriber::new("conn-c"));

        hub.register(sender.clone()).await.expect("register a");
        hub.register(peer_b.clone()).await.expect("register b");
        hub.register(peer_c.clone()).await.expect("register c");

        let delivered = hub.broadcast("conn-a", "event").await;
        assert_eq!(delivered, 2);
        assert!(sender.received().is_empty());
        assert_eq!(peer_b.received(), ["event"]);
        assert_eq!(peer_c.received(), ["event"]);
    }

    #[tokio::test]
    async fn register_enforces_connection_limit() {
        let hub = Hub::new(HubConfig { max_connections: 1 });
        let first = Arc::new(MockSubscriber::new("conn-a"));
        let second = Arc::new(MockSubscriber::new("conn-b"));

        hub.register(first).await.expect("register first");
        let error = hub
            .register(second)
            .await
            .expect_err("second registration should exceed limit");
        assert_eq!(error, HubError::TooManyConnections);
        assert_eq!(hub.connection_count().await, 1);
    }

    #[tokio::test]
    async fn broadcast_evicts_closed_or_slow_subscribers() {
        let hub = Hub::new(HubConfig::default());
        let closed = Arc::new(MockSubscriber::new("conn-a"));
        let slow = Arc::new(MockSubscriber::new("conn-b"));
        closed.set_closed(true);
        slow.set_send_ok(false);

        hub.register(closed).await.expect("register closed");
        hub.register(slow).await.expect("register slow");

        let delivered = hub.broadcast("", "event").await;
        assert_eq!(delivered, 0);
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_stops_delivery_and_rejects_unknown_ids() {
        let hub = Hub::new(HubConfig::default());
        let subscriber = Arc::new(MockSubscriber::new("conn-a"));
        let subscriber_id = hub.register(subscriber.clone()).await.expect("register");

        hub.unregister(subscriber_id).await.expect("unregister");
        assert_eq!(hub.broadcast("", "event").await, 0);
        assert!(subscriber.received().is_empty());

        let error = hub
            .unregister(subscriber_id)
            .await
            .expect_err("double unregister should fail");
        assert_eq!(error, HubError::SubscriberNotFound);
    }
}
