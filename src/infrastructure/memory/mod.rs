//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionManager 和 RenditionStore，管理生成会话及其演绎缓存的内存状态

mod rendition_store;
mod session_manager;

pub use rendition_store::InMemoryRenditionStore;
pub use session_manager::InMemorySessionManager;
