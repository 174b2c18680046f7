use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use http::header::SEC_WEBSOCKET_PROTOCOL;
use http::HeaderValue;
use stagesync_core::protocol::{ClientEvent, ServerEvent};
use stagesync_realtime::ws::WS_SUBPROTOCOL;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::ClientError;

pub(crate) const X_CONNECTION_ID: &str = "x-connection-id";

const EVENT_CHANNEL_SIZE: usize = 64;

type WsSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The broadcast channel from the client's side: emits update intents and
/// yields the change notifications other sessions caused.
pub struct EventSocket {
    connection_id: String,
    sink: SplitSink<WsSocket, Message>,
    events: mpsc::Receiver<ServerEvent>,
    reader: JoinHandle<()>,
}

impl EventSocket {
    /// Connects to `ws_url` (e.g. `ws://host:4000/api/v1/ws`), negotiates
    /// the subprotocol, and consumes the `connected` hello frame.
    pub async fn connect(ws_url: &str) -> Result<Self, ClientError> {
        let mut request = ws_url
            .into_client_request()
            .map_err(|error| ClientError::Connect(error.to_string()))?;
        request.headers_mut().insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(WS_SUBPROTOCOL),
        );

        let (mut socket, response) = connect_async(request)
            .await
            .map_err(|error| ClientError::Connect(error.to_string()))?;

        let subprotocol = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        if subprotocol.as_deref() != Some(WS_SUBPROTOCOL) {
            let _ = socket.close(None).await;
            return Err(ClientError::UnexpectedSubprotocol(subprotocol));
        }

        let connection_id = read_connected_hello(&mut socket).await?;

        let (sink, mut stream) = socket.split();
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(_) => break,
                };
                match frame {
                    Message::Text(payload) => {
                        match serde_json::from_str::<ServerEvent>(payload.as_str()) {
                            Ok(event) => {
                                if events_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(error) => {
                                tracing::warn!(%error, "ignoring undecodable server frame");
                            }
                        }
                    }
                    Message::Close(_) => break,
                    Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                }
            }
        });

        Ok(Self {
            connection_id,
            sink,
            events: events_rx,
            reader,
        })
    }

    /// The server-assigned session id from the `connected` hello.
    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// Next inbound notification; `None` once the connection is gone.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    /// Like `next_event` but returns immediately when nothing is queued.
    pub fn try_next_event(&mut self) -> Option<ServerEvent> {
        self.events.try_recv().ok()
    }

    /// Fire-and-forget update intent over the broadcast path. A send
    /// failure is dropped; the durable request path is the reliable one.
    pub async fn emit(&mut self, event: &ClientEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(_) => return,
        };
        if let Err(error) = self.sink.send(Message::Text(payload.into())).await {
            tracing::warn!(%error, "broadcast emit failed and was dropped");
        }
    }

    pub async fn close(mut self) {
        let _ = self.sink.close().await;
        self.reader.abort();
    }
}

impl Drop for EventSocket {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_connected_hello(socket: &mut WsSocket) -> Result<String, ClientError> {
    while let Some(frame) = socket.next().await {
        let frame = frame.map_err(|error| ClientError::Connect(error.to_string()))?;
        match frame {
            Message::Text(payload) => {
                let event: ServerEvent = serde_json::from_str(payload.as_str())
                    .map_err(|error| ClientError::Protocol(error.to_string()))?;
                let ServerEvent::Connected { connection_id } = event else {
                    return Err(ClientError::Protocol(
                        "expected connected hello frame".to_owned(),
                    ));
                };
                return Ok(connection_id);
            }
            Message::Close(_) => return Err(ClientError::Closed),
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    Err(ClientError::Closed)
}
