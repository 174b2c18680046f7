use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use stagesync_core::protocol::ServerEvent;
use stagesync_realtime::hub::{Hub, HubError, Subscriber, SubscriberId};
use stagesync_realtime::ws::CloseDirective;
use tokio::sync::mpsc;

const OUTBOUND_CHANNEL_SIZE: usize = 64;

pub(crate) type OutboundSender = mpsc::Sender<OutboundFrame>;
pub(crate) type OutboundReceiver = mpsc::Receiver<OutboundFrame>;

#[derive(Debug)]
pub(crate) enum OutboundFrame {
    Text(Arc<str>),
    Close(CloseDirective),
}

/// One connection's registration with the hub.
pub(crate) struct RealtimeSession {
    hub: Arc<Hub>,
    subscriber_id: SubscriberId,
    exclude_id: String,
}

impl RealtimeSession {
    pub(crate) fn exclude_id(&self) -> &str {
        &self.exclude_id
    }

    pub(crate) async fn unregister(&self) {
        let _ = self.hub.unregister(self.subscriber_id).await;
    }
}

pub(crate) fn outbound_channel() -> (OutboundSender, OutboundReceiver) {
    mpsc::channel(OUTBOUND_CHANNEL_SIZE)
}

pub(crate) async fn send_close(outbound: &OutboundSender, close: CloseDirective) {
    let _ = outbound.send(OutboundFrame::Close(close)).await;
}

pub(crate) async fn send_event(outbound: &OutboundSender, event: &ServerEvent) {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(_) => return,
    };
    let _ = outbound
        .send(OutboundFrame::Text(Arc::<str>::from(payload)))
        .await;
}

pub(crate) async fn register_session(
    hub: Arc<Hub>,
    connection_id: &str,
    outbound: OutboundSender,
    closed: Arc<AtomicBool>,
) -> Result<RealtimeSession, CloseDirective> {
    let subscriber = Arc::new(ConnectionSubscriber {
        exclude_id: connection_id.to_owned(),
        outbound,
        closed,
    });
    let subscriber_id = hub
        .register(subscriber)
        .await
        .map_err(map_register_error)?;

    Ok(RealtimeSession {
        hub,
        subscriber_id,
        exclude_id: connection_id.to_owned(),
    })
}

fn map_register_error(error: HubError) -> CloseDirective {
    match error {
        HubError::TooManyConnections => CloseDirective::too_many_connections(),
        HubError::SubscriberNotFound => CloseDirective::protocol_error("failed to register connection"),
    }
}

struct ConnectionSubscriber {
    exclude_id: String,
    outbound: OutboundSender,
    closed: Arc<AtomicBool>,
}

impl Subscriber for ConnectionSubscriber {
    fn send(&self, payload: Arc<str>) -> bool {
        self.outbound.try_send(OutboundFrame::Text(payload)).is_ok()
    }

    fn exclude_id(&self) -> &str {
        &self.exclude_id
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed) || self.outbound.is_closed()
    }
}
