use stagesync_core::protocol::ServerEvent;
use stagesync_storage::StorageError;

use crate::ApiState;

/// The gateway's single write primitive: persist, then notify every other
/// connected session. Both the request/response handlers and the broadcast
/// event handlers go through here, so a caller can never persist without
/// peers finding out.
///
/// The broadcast happens strictly after the storage call returns, so a
/// concurrent read by any notified session observes the new state.
pub(crate) async fn commit_update(
    state: &ApiState,
    exclude_id: &str,
    key: &str,
    value: Option<&str>,
) -> Result<(), StorageError> {
    match value {
        Some(value) => state.storage().upsert(key, value).await?,
        None => state.storage().delete(key).await?,
    }

    notify(
        state,
        exclude_id,
        &ServerEvent::DataChange {
            key: key.to_owned(),
            value: value.map(ToOwned::to_owned),
        },
    )
    .await;
    Ok(())
}

pub(crate) async fn commit_history(
    state: &ApiState,
    exclude_id: &str,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    state.storage().append_history(key, value).await?;

    notify(
        state,
        exclude_id,
        &ServerEvent::HistoryAdded {
            key: key.to_owned(),
            value: value.to_owned(),
        },
    )
    .await;
    Ok(())
}

async fn notify(state: &ApiState, exclude_id: &str, event: &ServerEvent) {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(_) => return,
    };
    let delivered = state.hub().broadcast(exclude_id, &payload).await;
    tracing::debug!(delivered, "change notification fanned out");
}
