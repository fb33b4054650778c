//! Domain Layer - 领域层
//!
//! 包含:
//! - Generation Context: 片段、演绎、生成批次
//! - Fragmenter: 文本切分（纯函数，无依赖）

pub mod generation;

mod fragmenter;

pub use fragmenter::{fragment_text, split_text, DEFAULT_MAX_CHARS};
