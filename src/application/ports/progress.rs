//! Progress Sink Port - 进度上报

use crate::domain::generation::RenditionLabel;

/// 生成过程事件
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// 单次合成失败（已跳过）
    AttemptFailed {
        position: u32,
        label: RenditionLabel,
        reason: String,
    },
    /// 一个片段处理完毕
    ///
    /// 单位为演绎：每个片段固定推进 rendition_count，与实际成功数无关
    Progress {
        position: u32,
        completed_units: usize,
        total_units: usize,
    },
    /// 批次完成并已打包
    RunCompleted {
        renditions: usize,
        complete_fragments: usize,
        total_fragments: usize,
    },
}

pub trait ProgressSinkPort: Send + Sync {
    fn report(&self, event: ProgressEvent);
}
