mod http;
mod ws;

pub use http::*;
pub use ws::*;
