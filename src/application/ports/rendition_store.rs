//! Rendition Store Port - 演绎缓存与进度
//!
//! 以片段位置为键，记录哪些片段已拿到全部演绎；作用域为单个生成会话

use std::collections::BTreeSet;

use crate::domain::generation::Rendition;

/// 运行级进度计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreProgress {
    pub current_fragment: u32,
    pub total_fragments: u32,
}

/// Rendition Store Port
///
/// 每个会话一个独立实例，跨会话共享属于错误用法
pub trait RenditionStorePort: Send + Sync {
    /// 该位置是否已完整缓存
    fn has_complete(&self, position: u32) -> bool;

    /// 该位置缓存的演绎（按标签排序）
    fn get_renditions(&self, position: u32) -> Vec<Rendition>;

    /// 写入完整演绎集并标记完成
    fn record_complete(&self, position: u32, renditions: Vec<Rendition>);

    /// 清空全部状态
    fn reset(&self);

    /// 所有缓存演绎（按位置、标签排序）
    fn all_renditions(&self) -> Vec<Rendition>;

    fn completed_positions(&self) -> BTreeSet<u32>;

    fn progress(&self) -> StoreProgress;

    fn set_progress(&self, current_fragment: u32, total_fragments: u32);

    /// 当前缓存对应的提交指纹
    fn fingerprint(&self) -> Option<String>;

    fn set_fingerprint(&self, fingerprint: String);
}
