use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::header::SEC_WEBSOCKET_PROTOCOL;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use stagesync_core::protocol::ServerEvent;
use stagesync_realtime::ws::{parse_client_text_frame, ClientFrame, CloseDirective, WS_SUBPROTOCOL};
use uuid::Uuid;

use crate::ApiState;

/// Interval between keepalive pings.
const WS_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

mod events;
mod realtime;


pub(crate) async fn websocket_upgrade(
    State(state): State<ApiState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if !requested_subprotocol(&headers) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    ws.protocols([WS_SUBPROTOCOL])
        .on_upgrade(move |socket| serve_websocket(socket, state))
        .into_response()
}

fn requested_subprotocol(headers: &HeaderMap) -> bool {
    headers
        .get(SEC_WEBSOCKET_PROTOCOL)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .split(',')
                .map(str::trim)
                .any(|candidate| candidate == WS_SUBPROTOCOL)
        })
}

async fn serve_websocket(socket: WebSocket, state: ApiState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (outbound, mut outbound_rx) = realtime::outbound_channel();
    let closed = Arc::new(AtomicBool::new(false));
    let writer_closed = Arc::clone(&closed);

    let writer = tokio::spawn(async move {
        let mut keepalive = tokio::time::interval(WS_KEEPALIVE_INTERVAL);
        keepalive.tick().await; // first tick fires immediately, skip it
        loop {
            tokio::select! {
                frame = outbound_rx.recv() => {
                    let Some(frame) = frame else { break };
                    match frame {
                        realtime::OutboundFrame::Text(payload) => {
                            if socket_sender
                                .send(Message::Text(payload.to_string().into()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        realtime::OutboundFrame::Close(close) => {
                            let frame = CloseFrame {
                                code: close.code as u16,
                                reason: close.reason.into(),
                            };
                            let _ = socket_sender.send(Message::Close(Some(frame))).await;
                            break;
                        }
                    }
                }
                _ = keepalive.tick() => {
                    if socket_sender
                        .send(Message::Ping(Vec::new().into()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
        writer_closed.store(true, Ordering::Relaxed);
    });

    let connection_id = Uuid::new_v4().to_string();
    let session = match realtime::register_session(
        Arc::clone(state.hub()),
        &connection_id,
        outbound.clone(),
        Arc::clone(&closed),
    )
    .await
    {
        Ok(session) => session,
        Err(close) => {
            realtime::send_close(&outbound, close).await;
            drop(outbound);
            let _ = writer.await;
            return;
        }
    };

    // Tell the session who it is, so its request-path writes can carry the
    // id and skip the echo.
    realtime::send_event(&outbound, &ServerEvent::Connected { connection_id }).await;

    while let Some(message) = socket_receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(_) => break,
        };

        match message {
            Message::Text(payload) => match parse_client_text_frame(payload.as_str()) {
                Ok(ClientFrame::Event(event)) => {
                    events::handle_client_event(&state, &session, event).await;
                }
                Ok(ClientFrame::UnknownEvent) => {}
                Err(close) => {
                    realtime::send_close(&outbound, close).await;
                    break;
                }
            },
            Message::Binary(_) => {
                realtime::send_close(
                    &outbound,
                    CloseDirective::protocol_error("expected text event frame"),
                )
                .await;
                break;
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    session.unregister().await;
    closed.store(true, Ordering::Relaxed);
    drop(outbound);
    let _ = writer.await;
}
