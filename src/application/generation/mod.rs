//! 应用层 - 生成流水线
//!
//! - engine: 单个片段的多次独立合成（演绎引擎）
//! - orchestrator: 切分 -> 逐片段演绎 -> 打包

mod engine;
mod orchestrator;

pub use engine::RenditionEngine;
pub use orchestrator::{recover_run, GenerationOrchestrator, RunMode};
