//! Generation Commands - 生成相关命令

use crate::application::generation::RunMode;
use crate::domain::generation::{GenerationSettings, RenditionLabel};

/// 提交生成命令
#[derive(Debug, Clone)]
pub struct StartGenerationCommand {
    /// 复用已有会话（None 时新建）
    pub session_id: Option<String>,
    pub text: String,
    pub settings: GenerationSettings,
    /// 复用会话缓存中已完成的片段
    pub resume: bool,
}

/// 提交生成响应
#[derive(Debug, Clone)]
pub struct StartGenerationResponse {
    pub session_id: String,
    pub total_fragments: usize,
    pub total_units: usize,
    pub mode: RunMode,
}

/// 交给后台 worker 的生成任务
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub session_id: String,
    pub text: String,
    pub settings: GenerationSettings,
    pub mode: RunMode,
}

/// 恢复上一次生成命令
#[derive(Debug, Clone)]
pub struct RecoverGenerationCommand {
    pub session_id: String,
}

/// 恢复响应
#[derive(Debug, Clone)]
pub struct RecoverGenerationResponse {
    pub session_id: String,
    pub renditions: usize,
    pub complete_fragments: usize,
    pub labels: Vec<RenditionLabel>,
    pub timestamp: String,
}

/// 关闭会话命令
#[derive(Debug, Clone)]
pub struct CloseGenerationCommand {
    pub session_id: String,
}

/// 关闭会话响应
#[derive(Debug, Clone)]
pub struct CloseGenerationResponse {
    pub session_id: String,
}
