//! HTTP Handlers

mod generation;
mod ping;
mod voice;
mod websocket;

pub use generation::*;
pub use ping::*;
pub use voice::*;
pub use websocket::*;
