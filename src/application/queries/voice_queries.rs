//! Voice Queries

/// 列出 API key 可用的音色
#[derive(Debug, Clone)]
pub struct ListVoices {
    pub api_key: String,
}
