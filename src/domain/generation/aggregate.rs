//! Generation Context - Aggregate Root

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Rendition, RenditionKey, RenditionLabel};

/// 归档组 - 标签 -> 压缩包字节
///
/// 由演绎集合确定性地派生，创建后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveGroup {
    archives: BTreeMap<RenditionLabel, Vec<u8>>,
}

impl ArchiveGroup {
    pub fn new(archives: BTreeMap<RenditionLabel, Vec<u8>>) -> Self {
        Self { archives }
    }

    pub fn get(&self, label: RenditionLabel) -> Option<&[u8]> {
        self.archives.get(&label).map(Vec::as_slice)
    }

    pub fn labels(&self) -> Vec<RenditionLabel> {
        self.archives.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

/// 生成批次聚合根
///
/// 不变量:
/// - 每个 (片段位置, 标签) 至多一个演绎
/// - complete_positions 中的位置拥有全部标签的演绎
/// - 完成后附带打包结果
#[derive(Debug, Clone)]
pub struct GenerationRun {
    id: Uuid,
    created_at: DateTime<Utc>,
    renditions: BTreeMap<RenditionKey, Rendition>,
    complete_positions: BTreeSet<u32>,
    archives: Option<ArchiveGroup>,
}

impl GenerationRun {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            renditions: BTreeMap::new(),
            complete_positions: BTreeSet::new(),
            archives: None,
        }
    }

    /// 追加演绎，同键的旧演绎被替换
    pub fn add_renditions(&mut self, renditions: impl IntoIterator<Item = Rendition>) {
        for rendition in renditions {
            if let Some(previous) = self.renditions.insert(rendition.key(), rendition) {
                tracing::debug!(
                    position = previous.position,
                    label = %previous.label,
                    "Replaced rendition with same key"
                );
            }
        }
    }

    pub fn mark_fragment_complete(&mut self, position: u32) {
        self.complete_positions.insert(position);
    }

    /// 标记批次完成
    pub fn complete(&mut self, archives: ArchiveGroup) {
        self.archives = Some(archives);
    }

    /// 恢复时刷新时间戳
    pub fn restamp(&mut self) {
        self.created_at = Utc::now();
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 用于文件名的时间戳
    pub fn timestamp_label(&self) -> String {
        self.created_at.format("%Y%m%d_%H%M%S").to_string()
    }

    pub fn is_complete(&self) -> bool {
        self.archives.is_some()
    }

    pub fn archives(&self) -> Option<&ArchiveGroup> {
        self.archives.as_ref()
    }

    /// 按 (位置, 标签) 排序的演绎
    pub fn renditions(&self) -> Vec<Rendition> {
        self.renditions.values().cloned().collect()
    }

    pub fn rendition_count(&self) -> usize {
        self.renditions.len()
    }

    pub fn complete_positions(&self) -> &BTreeSet<u32> {
        &self.complete_positions
    }

    pub fn labels(&self) -> BTreeSet<RenditionLabel> {
        self.renditions.keys().map(|k| k.label).collect()
    }
}

impl Default for GenerationRun {
    fn default() -> Self {
        Self::new()
    }
}
