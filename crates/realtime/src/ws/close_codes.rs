use stagesync_core::protocol::{
    CLOSE_PROTOCOL_ERROR, CLOSE_SLOW_CONSUMER, CLOSE_TOO_MANY_CONNECTIONS,
};

pub const WS_SUBPROTOCOL: &str = "stagesync-v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseDirective {
    pub code: i32,
    pub reason: &'static str,
}

impl CloseDirective {
    #[must_use]
    pub const fn protocol_error(reason: &'static str) -> Self {
        Self {
            code: CLOSE_PROTOCOL_ERROR,
            reason,
        }
    }

    #[must_use]
    pub const fn too_many_connections() -> Self {
        Self {
            code: CLOSE_TOO_MANY_CONNECTIONS,
            reason: "too many connections",
        }
    }

    #[must_use]
    pub const fn slow_consumer() -> Self {
        Self {
            code: CLOSE_SLOW_CONSUMER,
            reason: "slow consumer",
        }
    }
}
