//! Session Manager Port - 生成会话生命周期管理
//!
//! 每个调用方一个会话，会话独占自己的演绎缓存；具体实现在 infrastructure/memory 层

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::RenditionStorePort;
use crate::domain::generation::GenerationRun;

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未提交生成
    Idle,
    /// 已入队，等待 worker
    Queued,
    /// 正在生成
    Running,
    /// 最近一次生成已完成并打包
    Completed,
    /// 最近一次生成中断
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// 是否有生成正在进行（排队中或运行中）
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

/// 生成会话（in-memory）
#[derive(Clone)]
pub struct GenerationSession {
    pub id: String,
    pub store: Arc<dyn RenditionStorePort>,
    pub state: SessionState,
    /// 最近一次提交的演绎数量（用于换算进度单位）
    pub rendition_count: usize,
    pub last_run: Option<Arc<GenerationRun>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl std::fmt::Debug for GenerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("rendition_count", &self.rendition_count)
            .field("has_run", &self.last_run.is_some())
            .field("error", &self.error)
            .finish()
    }
}

/// Session Manager Port
///
/// 所有状态存储在内存中，不提供跨进程持久化
pub trait SessionManagerPort: Send + Sync {
    /// 创建新会话（附带全新的演绎缓存），返回会话快照
    fn create(&self) -> GenerationSession;

    /// 获取会话快照
    fn get(&self, id: &str) -> Result<GenerationSession, SessionError>;

    /// 入队：Idle/Completed/Failed -> Queued
    fn mark_queued(&self, id: &str, rendition_count: usize) -> Result<(), SessionError>;

    fn set_state(&self, id: &str, state: SessionState) -> Result<(), SessionError>;

    /// 保存生成结果，状态置为 Completed
    fn set_run(&self, id: &str, run: GenerationRun) -> Result<(), SessionError>;

    /// 记录失败，状态置为 Failed
    fn set_failed(&self, id: &str, error: String) -> Result<(), SessionError>;

    fn is_valid(&self, id: &str) -> bool;

    /// 关闭会话并释放其缓存
    fn close(&self, id: &str) -> Result<(), SessionError>;

    /// 更新最后活动时间
    fn touch(&self, id: &str);

    /// 获取所有过期会话的 ID
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    fn list_all(&self) -> Vec<String>;
}
