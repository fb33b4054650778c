//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::generation::{
    MAX_MAX_CHARS, MAX_PACING_DELAY_MS, MAX_RENDITION_COUNT, MIN_MAX_CHARS, MIN_PACING_DELAY_MS,
};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXBATCH_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXBATCH_SERVER__PORT=8080`
/// - `VOXBATCH_PROVIDER__BASE_URL=http://localhost:9000`
/// - `VOXBATCH_GENERATION__PACING_DELAY_MS=3000`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("server.max_body_bytes", 10 * 1024 * 1024)?
        .set_default("provider.base_url", "https://api.elevenlabs.io")?
        .set_default("provider.timeout_secs", 120)?
        .set_default("generation.max_chars", 250)?
        .set_default("generation.rendition_count", 3)?
        .set_default("generation.pacing_delay_ms", 5500)?
        .set_default("generation.model_id", "eleven_multilingual_v2")?
        .set_default("generation.stability", 0.5)?
        .set_default("generation.similarity", 0.75)?
        .set_default("generation.use_speaker_boost", true)?
        .set_default("worker.max_concurrent", 2)?
        .set_default("worker.queue_capacity", 64)?
        .set_default("gc.enabled", true)?
        .set_default("gc.interval_secs", 600)?
        .set_default("gc.session_expire_secs", 86400)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("VOXBATCH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.server.max_body_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Server max_body_bytes cannot be 0".to_string(),
        ));
    }

    if config.provider.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Provider base URL cannot be empty".to_string(),
        ));
    }

    let generation = &config.generation;
    if !(MIN_MAX_CHARS..=MAX_MAX_CHARS).contains(&generation.max_chars) {
        return Err(ConfigError::ValidationError(format!(
            "generation.max_chars must be within {}..={}, got {}",
            MIN_MAX_CHARS, MAX_MAX_CHARS, generation.max_chars
        )));
    }

    if generation.rendition_count == 0 || generation.rendition_count > MAX_RENDITION_COUNT {
        return Err(ConfigError::ValidationError(format!(
            "generation.rendition_count must be within 1..={}, got {}",
            MAX_RENDITION_COUNT, generation.rendition_count
        )));
    }

    for (name, value) in [
        ("stability", generation.stability),
        ("similarity", generation.similarity),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ValidationError(format!(
                "generation.{} must be within [0, 1], got {}",
                name, value
            )));
        }
    }

    if !(MIN_PACING_DELAY_MS..=MAX_PACING_DELAY_MS).contains(&generation.pacing_delay_ms) {
        return Err(ConfigError::ValidationError(format!(
            "generation.pacing_delay_ms must be within {}..={}, got {}",
            MIN_PACING_DELAY_MS, MAX_PACING_DELAY_MS, generation.pacing_delay_ms
        )));
    }

    if config.gc.enabled && config.gc.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "GC interval cannot be 0 when GC is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Max Body: {} bytes", config.server.max_body_bytes);
    if !config.server.cors_origins.is_empty() {
        tracing::info!("CORS Origins: {}", config.server.cors_origins.join(", "));
    }
    tracing::info!("Provider URL: {}", config.provider.base_url);
    tracing::info!("Provider Timeout: {}s", config.provider.timeout_secs);
    tracing::info!("Max Chars: {}", config.generation.max_chars);
    tracing::info!("Renditions: {}", config.generation.rendition_count);
    tracing::info!("Pacing Delay: {}ms", config.generation.pacing_delay_ms);
    tracing::info!("Model: {}", config.generation.model_id);
    tracing::info!("Worker Concurrency: {}", config.worker.max_concurrent);
    tracing::info!("GC Enabled: {}", config.gc.enabled);
    if config.gc.enabled {
        tracing::info!("GC Interval: {}s", config.gc.interval_secs);
        tracing::info!("Session Expire: {}s", config.gc.session_expire_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
