use stagesync_core::{allowed, protocol::ClientEvent};

use super::realtime::RealtimeSession;
use crate::{commit, ApiState};

/// Handles one inbound intent from the broadcast path: validate, persist,
/// rebroadcast to everyone but the sender. Fire-and-forget — there is no
/// reply channel, so rejection and failure are silent for the sender.
pub(crate) async fn handle_client_event(
    state: &ApiState,
    session: &RealtimeSession,
    event: ClientEvent,
) {
    match event {
        ClientEvent::DataUpdate { key, value } => {
            if !allowed(&key) {
                tracing::debug!(key = %key, "dropped update intent for disallowed key");
                return;
            }
            // TODO: surface broadcast-path storage failures to the sender once
            // the protocol grows an error event; today the update is lost.
            if let Err(error) =
                commit::commit_update(state, session.exclude_id(), &key, value.as_deref()).await
            {
                tracing::warn!(key = %key, %error, "broadcast-path update lost");
            }
        }
        ClientEvent::HistoryWrite { key, value } => {
            if !allowed(&key) {
                tracing::debug!(key = %key, "dropped history intent for disallowed key");
                return;
            }
            if let Err(error) =
                commit::commit_history(state, session.exclude_id(), &key, &value).await
            {
                tracing::warn!(key = %key, %error, "broadcast-path history write lost");
            }
        }
    }
}
