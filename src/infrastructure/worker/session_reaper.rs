//! Session Reaper - 回收长时间空闲的会话
//!
//! 关闭会话会一并释放其演绎缓存

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::SessionManagerPort;
use crate::infrastructure::events::EventPublisher;

/// 会话回收器配置
#[derive(Debug, Clone)]
pub struct SessionReaperConfig {
    /// 扫描间隔
    pub interval: Duration,
    /// 空闲超时（秒）
    pub session_expire_secs: u64,
}

pub struct SessionReaper {
    config: SessionReaperConfig,
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SessionReaper {
    pub fn new(
        config: SessionReaperConfig,
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            session_manager,
            event_publisher,
        }
    }

    /// 执行一次回收，返回被关闭的会话数
    pub fn sweep(&self) -> usize {
        let expired = self
            .session_manager
            .get_expired_sessions(self.config.session_expire_secs);

        let mut closed = 0;
        for session_id in expired {
            if self.session_manager.close(&session_id).is_ok() {
                self.event_publisher
                    .publish_session_closed(&session_id, "expired");
                self.event_publisher.unregister_session(&session_id);
                closed += 1;
            }
        }

        if closed > 0 {
            tracing::info!(closed = closed, "Expired sessions reaped");
        }
        closed
    }

    /// 启动回收循环
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            expire_secs = self.config.session_expire_secs,
            "SessionReaper started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep();
        }
    }
}
