//! Worker Layer - Background Task Processing
//!
//! - GenerationWorker: 消费生成任务队列
//! - SessionReaper: 回收空闲会话

mod generation_worker;
mod session_reaper;

pub use generation_worker::{GenerationWorker, GenerationWorkerConfig};
pub use session_reaper::{SessionReaper, SessionReaperConfig};
