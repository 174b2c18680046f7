use serde::{Deserialize, Serialize};

// WebSocket close codes.
pub const CLOSE_TOO_MANY_CONNECTIONS: i32 = 4003;
pub const CLOSE_PROTOCOL_ERROR: i32 = 4005;
pub const CLOSE_SLOW_CONSUMER: i32 = 4006;

/// Frames a client may send. Fire-and-forget: the server never replies on
/// this channel, it only persists and rebroadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Intent to change a key. `value: null` is a delete intent.
    #[serde(rename = "dataUpdate")]
    DataUpdate {
        #[serde(rename = "key")]
        key: String,
        #[serde(rename = "value")]
        value: Option<String>,
    },
    /// Intent to append one history entry.
    #[serde(rename = "historyWrite")]
    HistoryWrite {
        #[serde(rename = "key")]
        key: String,
        #[serde(rename = "value")]
        value: String,
    },
}

/// Frames the server pushes to connected sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// First frame after the upgrade: the session id the server assigned.
    /// Clients echo it back in `x-connection-id` on request-path writes so
    /// their own edits are not broadcast back to them.
    #[serde(rename = "connected")]
    Connected {
        #[serde(rename = "connection_id")]
        connection_id: String,
    },
    /// A key changed (or was deleted, `value: null`) somewhere else.
    #[serde(rename = "dataChange")]
    DataChange {
        #[serde(rename = "key")]
        key: String,
        #[serde(rename = "value")]
        value: Option<String>,
    },
    /// A history entry was appended somewhere else.
    #[serde(rename = "historyAdded")]
    HistoryAdded {
        #[serde(rename = "key")]
        key: String,
        #[serde(rename = "value")]
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_wire_shape() {
        let update = ClientEvent::DataUpdate {
            key: "stageProgress:t-line-stage-1".to_owned(),
            value: Some("75".to_owned()),
        };
        let encoded = serde_json::to_string(&update).expect("encode");
        assert_eq!(
            encoded,
            r#"{"event":"dataUpdate","data":{"key":"stageProgress:t-line-stage-1","value":"75"}}"#
        );
        let decoded: ClientEvent = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, update);
    }

    #[test]
    fn data_update_null_value_is_a_delete_intent() {
        let frame =
            r#"{"event":"dataUpdate","data":{"key":"stageProgress:t-line-stage-1","value":null}}"#;
        let decoded: ClientEvent = serde_json::from_str(frame).expect("decode");
        assert_eq!(
            decoded,
            ClientEvent::DataUpdate {
                key: "stageProgress:t-line-stage-1".to_owned(),
                value: None,
            }
        );
    }

    #[test]
    fn server_event_roundtrip() {
        let events = [
            ServerEvent::Connected {
                connection_id: "b2c7a9d0-1111-4e4e-9c4e-6f0a37f0c0de".to_owned(),
            },
            ServerEvent::DataChange {
                key: "integratorName:t-line".to_owned(),
                value: None,
            },
            ServerEvent::HistoryAdded {
                key: "history:t-line:stage-1:step-0".to_owned(),
                value: "true".to_owned(),
            },
        ];
        for event in events {
            let encoded = serde_json::to_string(&event).expect("encode");
            let decoded: ServerEvent = serde_json::from_str(&encoded).expect("decode");
            assert_eq!(decoded, event);
        }
    }

    #[test]
    fn unknown_event_fails_to_decode() {
        let frame = r#"{"event":"presence","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(frame).is_err());
    }
}
