//! Generation Context - Entities

use super::{RenditionKey, RenditionLabel};

/// 文本片段
///
/// 不变量:
/// - position 从 1 开始，按原文顺序递增
/// - 创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub position: u32,
    pub text: String,
}

impl Fragment {
    pub fn new(position: u32, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// 演绎 - 某个片段的一次成功合成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub position: u32,
    pub label: RenditionLabel,
    /// 源片段文本
    pub text: String,
    /// 原始音频字节（提供方返回的 MP3）
    pub audio: Vec<u8>,
}

impl Rendition {
    pub fn new(fragment: &Fragment, label: RenditionLabel, audio: Vec<u8>) -> Self {
        Self {
            position: fragment.position,
            label,
            text: fragment.text.clone(),
            audio,
        }
    }

    pub fn key(&self) -> RenditionKey {
        RenditionKey::new(self.position, self.label)
    }
}
