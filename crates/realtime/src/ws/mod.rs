mod close_codes;
mod protocol;

pub use close_codes::{CloseDirective, WS_SUBPROTOCOL};
pub use protocol::{parse_client_text_frame, ClientFrame};
