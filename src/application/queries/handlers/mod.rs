//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod generation_handlers;
mod voice_handlers;

pub use generation_handlers::*;
pub use voice_handlers::*;
