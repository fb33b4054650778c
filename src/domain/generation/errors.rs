//! Generation Context - Errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("文本不能为空")]
    EmptyText,

    #[error("缺少 API key")]
    MissingApiKey,

    #[error("缺少音色 ID")]
    MissingVoice,

    #[error("最大字符数必须在 {min} 到 {max} 之间: {value}")]
    InvalidMaxChars { value: usize, min: usize, max: usize },

    #[error("演绎数量必须在 1 到 {max} 之间: {value}")]
    InvalidRenditionCount { value: usize, max: usize },

    #[error("节流间隔必须在 {min} 到 {max} 毫秒之间: {value}")]
    InvalidPacingDelay { value: u128, min: u64, max: u64 },

    #[error("{name} 必须在 0.0 到 1.0 之间: {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },

    #[error("无效的演绎标签: {0}")]
    InvalidLabel(String),
}
