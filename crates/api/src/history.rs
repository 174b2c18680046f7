use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use stagesync_core::allowed;
use stagesync_core::protocol::{HistoryEntryWire, HistoryResponse, OkResponse, ValueBody};

use crate::data::{sender_connection_id, storage_failure, unknown_key};
use crate::{commit, ApiState};

pub(crate) async fn get_history(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Response {
    if !allowed(&key) {
        return unknown_key();
    }

    match state.storage().list_history(&key).await {
        Ok(entries) => Json(HistoryResponse {
            history: entries
                .into_iter()
                .map(|entry| HistoryEntryWire {
                    value: entry.value,
                    updated_at: entry.updated_at,
                })
                .collect(),
        })
        .into_response(),
        Err(error) => storage_failure("history read", &key, &error),
    }
}

pub(crate) async fn post_history(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ValueBody>,
) -> Response {
    if !allowed(&key) {
        return unknown_key();
    }

    match commit::commit_history(&state, sender_connection_id(&headers), &key, &body.value).await {
        Ok(()) => Json(OkResponse { ok: true }).into_response(),
        Err(error) => storage_failure("history write", &key, &error),
    }
}

#[cfg(test)]
mod tests {
    use stagesync_core::protocol::HistoryResponse;

    use crate::test_support::spawn_server;

    #[tokio::test]
    async fn posted_entries_come_back_newest_first() {
        let server = spawn_server().await;
        let url = server.history_url("history:t-line:stage-1:step-0");

        for value in ["false", "true"] {
            server
                .http
                .post(&url)
                .json(&serde_json::json!({ "value": value }))
                .send()
                .await
                .expect("post");
        }

        let response: HistoryResponse = server
            .http
            .get(&url)
            .send()
            .await
            .expect("get")
            .json()
            .await
            .expect("body");
        let values: Vec<&str> = response
            .history
            .iter()
            .map(|entry| entry.value.as_str())
            .collect();
        assert_eq!(values, ["true", "false"]);
        assert!(!response.history[0].updated_at.is_empty());

        server.handle.abort();
    }

    #[tokio::test]
    async fn history_of_unwritten_key_is_empty() {
        let server = spawn_server().await;

        let response: HistoryResponse = server
            .http
            .get(server.history_url("history:t-line:stage-1:step-7"))
            .send()
            .await
            .expect("get")
            .json()
            .await
            .expect("body");
        assert!(response.history.is_empty());

        server.handle.abort();
    }

    #[tokio::test]
    async fn disallowed_key_is_rejected_with_400() {
        let server = spawn_server().await;

        let response = server
            .http
            .post(server.history_url("audit:t-line"))
            .json(&serde_json::json!({ "value": "x" }))
            .send()
            .await
            .expect("post");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

        server.handle.abort();
    }
}
