//! Synthesis Port - 语音合成提供方抽象
//!
//! 定义提供方的两个操作（音色列表、语音合成），具体实现在 infrastructure/adapters 层

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::generation::{GenerationSettings, VoiceSettings};

/// 单次合成失败原因
///
/// 作为结果类型返回，由演绎引擎检查，不向上传播
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// 无法连接提供方 / 传输中断
    #[error("Transport error: {0}")]
    Transport(String),

    /// 提供方返回非成功状态码
    #[error("Provider returned HTTP {status}")]
    Provider { status: u16 },
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice: VoiceSettings,
}

impl SynthesisRequest {
    pub fn from_settings(text: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            text: text.into(),
            api_key: settings.api_key.clone(),
            voice_id: settings.voice_id.clone(),
            model_id: settings.model_id.clone(),
            voice: settings.voice,
        }
    }
}

/// Synthesis Port
///
/// 不在内部重试，重试策略属于演绎引擎
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// 音色名称 -> 音色 ID
    ///
    /// 任何传输错误或非 2xx 响应都返回空表；调用方应把空表视为"不可用"
    async fn list_voices(&self, api_key: &str) -> BTreeMap<String, String>;

    /// 合成一段文本，成功时返回原始音频字节
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError>;
}
