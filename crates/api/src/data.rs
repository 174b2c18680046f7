use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use stagesync_core::allowed;
use stagesync_core::protocol::{ErrorResponse, OkResponse, ValueBody, ValueResponse};

use crate::{commit, ApiState, X_CONNECTION_ID};

pub(crate) async fn get_value(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Response {
    if !allowed(&key) {
        return unknown_key();
    }

    match state.storage().get(&key).await {
        Ok(value) => Json(ValueResponse { value }).into_response(),
        Err(error) => storage_failure("read", &key, &error),
    }
}

pub(crate) async fn put_value(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ValueBody>,
) -> Response {
    if !allowed(&key) {
        return unknown_key();
    }

    match commit::commit_update(&state, sender_connection_id(&headers), &key, Some(&body.value))
        .await
    {
        Ok(()) => Json(OkResponse { ok: true }).into_response(),
        Err(error) => storage_failure("write", &key, &error),
    }
}

pub(crate) async fn delete_value(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !allowed(&key) {
        return unknown_key();
    }

    match commit::commit_update(&state, sender_connection_id(&headers), &key, None).await {
        Ok(()) => Json(OkResponse { ok: true }).into_response(),
        Err(error) => storage_failure("delete", &key, &error),
    }
}

pub(crate) fn sender_connection_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_CONNECTION_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

pub(crate) fn unknown_key() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Unknown key".to_owned(),
        }),
    )
        .into_response()
}

pub(crate) fn storage_failure(
    operation: &str,
    key: &str,
    error: &stagesync_storage::StorageError,
) -> Response {
    tracing::error!(operation, key, %error, "storage call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "storage failure".to_owned(),
        }),
    )
        .into_response()
}
