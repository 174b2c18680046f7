use serde::Deserialize;
use stagesync_core::protocol::ClientEvent;

use super::close_codes::CloseDirective;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    Event(ClientEvent),
    /// Well-formed frame carrying an event name this server does not know.
    /// Ignored rather than fatal so older servers tolerate newer clients.
    UnknownEvent,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "event")]
    event: String,
}

/// Parses one inbound text frame. Malformed JSON or a frame without an
/// `event` field closes the connection; unknown event names do not.
pub fn parse_client_text_frame(payload: &str) -> Result<ClientFrame, CloseDirective> {
    if payload.is_empty() {
        return Err(CloseDirective::protocol_error("empty text frame"));
    }

    let raw: RawFrame = serde_json::from_str(payload)
        .map_err(|_| CloseDirective::protocol_error("invalid json frame"))?;

    match raw.event.as_str() {
        "dataUpdate" | "historyWrite" => serde_json::from_str::<ClientEvent>(payload)
            .map(ClientFrame::Event)
            .map_err(|_| CloseDirective::protocol_error("malformed event payload")),
        _ => Ok(ClientFrame::UnknownEvent),
    }
}
