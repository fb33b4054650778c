//! Generation Context - 生成批次限界上下文
//!
//! 职责:
//! - 片段（Fragment）与演绎（Rendition）建模
//! - 生成参数校验与提交指纹
//! - 生成批次（GenerationRun）生命周期

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{ArchiveGroup, GenerationRun};
pub use entities::{Fragment, Rendition};
pub use errors::GenerationError;
pub use value_objects::{
    GenerationSettings, RenditionKey, RenditionLabel, VoiceSettings, DEFAULT_MODEL_ID,
    DEFAULT_RENDITION_COUNT, MAX_MAX_CHARS, MAX_PACING_DELAY_MS, MAX_RENDITION_COUNT, MIN_MAX_CHARS,
    MIN_PACING_DELAY_MS,
};
