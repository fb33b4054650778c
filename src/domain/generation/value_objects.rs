//! Generation Context - Value Objects

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::GenerationError;
use crate::domain::DEFAULT_MAX_CHARS;

/// 默认演绎数量
pub const DEFAULT_RENDITION_COUNT: usize = 3;

/// 标签字母表大小（a-z）
pub const MAX_RENDITION_COUNT: usize = 26;

/// 默认多语言模型
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// 片段最大字符数允许范围
pub const MIN_MAX_CHARS: usize = 100;
pub const MAX_MAX_CHARS: usize = 500;

/// 节流间隔允许范围（毫秒）
pub const MIN_PACING_DELAY_MS: u64 = 500;
pub const MAX_PACING_DELAY_MS: u64 = 10_500;

/// 演绎标签
///
/// 有序的固定字母表：第 i 次独立合成对应第 i 个小写字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenditionLabel(u8);

impl RenditionLabel {
    pub fn from_index(index: usize) -> Result<Self, GenerationError> {
        if index >= MAX_RENDITION_COUNT {
            return Err(GenerationError::InvalidLabel(index.to_string()));
        }
        Ok(Self(index as u8))
    }

    /// 前 `count` 个标签（超出字母表的部分被截断）
    pub fn first(count: usize) -> Vec<Self> {
        (0..count.min(MAX_RENDITION_COUNT))
            .map(|i| Self(i as u8))
            .collect()
    }

    /// 解析单个字母标签（如 "a"）
    pub fn parse(s: &str) -> Result<Self, GenerationError> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Ok(Self(c as u8 - b'a')),
            _ => Err(GenerationError::InvalidLabel(s.to_string())),
        }
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn as_char(&self) -> char {
        (b'a' + self.0) as char
    }
}

impl fmt::Display for RenditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 演绎的结构化键：(片段位置, 标签)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenditionKey {
    pub position: u32,
    pub label: RenditionLabel,
}

impl RenditionKey {
    pub fn new(position: u32, label: RenditionLabel) -> Self {
        Self { position, label }
    }
}

/// 音色参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// 稳定性 (0.0 - 1.0)
    pub stability: f32,
    /// 相似度增强 (0.0 - 1.0)
    pub similarity: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity: 0.75,
            use_speaker_boost: true,
        }
    }
}

impl VoiceSettings {
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (name, value) in [("stability", self.stability), ("similarity", self.similarity)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GenerationError::OutOfUnitRange { name, value });
            }
        }
        Ok(())
    }
}

/// 一次提交的全部生成参数
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice: VoiceSettings,
    pub max_chars: usize,
    pub rendition_count: usize,
    /// 两次成功调用之间的最小间隔
    pub pacing_delay: Duration,
}

impl GenerationSettings {
    /// 使用默认参数创建
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice: VoiceSettings::default(),
            max_chars: DEFAULT_MAX_CHARS,
            rendition_count: DEFAULT_RENDITION_COUNT,
            pacing_delay: Duration::from_millis(5500),
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey);
        }
        if self.voice_id.trim().is_empty() {
            return Err(GenerationError::MissingVoice);
        }
        if !(MIN_MAX_CHARS..=MAX_MAX_CHARS).contains(&self.max_chars) {
            return Err(GenerationError::InvalidMaxChars {
                value: self.max_chars,
                min: MIN_MAX_CHARS,
                max: MAX_MAX_CHARS,
            });
        }
        if self.rendition_count == 0 || self.rendition_count > MAX_RENDITION_COUNT {
            return Err(GenerationError::InvalidRenditionCount {
                value: self.rendition_count,
                max: MAX_RENDITION_COUNT,
            });
        }
        let pacing_ms = self.pacing_delay.as_millis();
        if !(u128::from(MIN_PACING_DELAY_MS)..=u128::from(MAX_PACING_DELAY_MS)).contains(&pacing_ms) {
            return Err(GenerationError::InvalidPacingDelay {
                value: pacing_ms,
                min: MIN_PACING_DELAY_MS,
                max: MAX_PACING_DELAY_MS,
            });
        }
        self.voice.validate()
    }

    pub fn labels(&self) -> Vec<RenditionLabel> {
        RenditionLabel::first(self.rendition_count)
    }

    /// 提交指纹
    ///
    /// md5(文本 + 所有影响音频的参数)，API key 和节流间隔不参与
    pub fn fingerprint(&self, text: &str) -> String {
        let material = format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
            text,
            self.max_chars,
            self.voice_id,
            self.model_id,
            self.voice.stability,
            self.voice.similarity,
            self.voice.use_speaker_boost,
            self.rendition_count,
        );
        format!("{:x}", md5::compute(material.as_bytes()))
    }
}
