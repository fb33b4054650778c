//! Configuration Types
//!
//! 定义所有配置结构体

use std::time::Duration;

use serde::Deserialize;

use crate::domain::generation::{
    GenerationSettings, VoiceSettings, DEFAULT_MODEL_ID, DEFAULT_RENDITION_COUNT,
};
use crate::domain::DEFAULT_MAX_CHARS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 语音合成提供方配置
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 生成参数默认值
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 后台 Worker 配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// GC 配置
    #[serde(default)]
    pub gc: GcConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节），限制单次提交的文本大小
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// 允许跨域的来源，为空时允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 语音合成提供方配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// 服务基础 URL
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_provider_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

/// 生成参数默认值（请求未指定时使用）
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// 片段最大字符数（100..=500）
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// 每个片段的演绎数量
    #[serde(default = "default_rendition_count")]
    pub rendition_count: usize,

    /// 两次成功调用之间的最小间隔（毫秒）
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_stability")]
    pub stability: f32,

    #[serde(default = "default_similarity")]
    pub similarity: f32,

    #[serde(default = "default_speaker_boost")]
    pub use_speaker_boost: bool,
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_rendition_count() -> usize {
    DEFAULT_RENDITION_COUNT
}

fn default_pacing_delay_ms() -> u64 {
    5500
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity() -> f32 {
    0.75
}

fn default_speaker_boost() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            rendition_count: default_rendition_count(),
            pacing_delay_ms: default_pacing_delay_ms(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity: default_similarity(),
            use_speaker_boost: default_speaker_boost(),
        }
    }
}

impl GenerationConfig {
    /// 以配置默认值构造一次提交的生成参数
    pub fn settings(
        &self,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> GenerationSettings {
        GenerationSettings {
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: self.model_id.clone(),
            voice: VoiceSettings {
                stability: self.stability,
                similarity: self.similarity,
                use_speaker_boost: self.use_speaker_boost,
            },
            max_chars: self.max_chars,
            rendition_count: self.rendition_count,
            pacing_delay: Duration::from_millis(self.pacing_delay_ms),
        }
    }
}

/// 后台 Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 同时运行的生成批次上限
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 任务队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// GC（会话回收）配置
#[derive(Debug, Clone, Deserialize)]
pub struct GcConfig {
    /// 是否启用自动 GC
    #[serde(default = "default_gc_enabled")]
    pub enabled: bool,

    /// GC 间隔时间（秒）
    #[serde(default = "default_gc_interval")]
    pub interval_secs: u64,

    /// Session 过期时间（秒）
    #[serde(default = "default_session_expire")]
    pub session_expire_secs: u64,
}

fn default_gc_enabled() -> bool {
    true
}

fn default_gc_interval() -> u64 {
    600 // 10 分钟
}

fn default_session_expire() -> u64 {
    86400 // 24 小时
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: default_gc_enabled(),
            interval_secs: default_gc_interval(),
            session_expire_secs: default_session_expire(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5060);
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.provider.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.generation.max_chars, 250);
        assert_eq!(config.generation.rendition_count, 3);
        assert_eq!(config.generation.pacing_delay_ms, 5500);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5060");
    }

    #[test]
    fn test_generation_settings_from_defaults() {
        let settings = GenerationConfig::default().settings("key", "voice");
        assert_eq!(settings.model_id, "eleven_multilingual_v2");
        assert_eq!(settings.voice, VoiceSettings::default());
        assert_eq!(settings.pacing_delay, Duration::from_millis(5500));
        assert!(settings.validate().is_ok());
    }
}
