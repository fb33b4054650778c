//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::application::ports::{ProgressEvent, ProgressSinkPort};

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 一个片段处理完毕
    Progress {
        session_id: String,
        position: u32,
        completed_units: usize,
        total_units: usize,
    },
    /// 单次合成失败（已跳过）
    AttemptFailed {
        session_id: String,
        position: u32,
        label: String,
        reason: String,
    },
    /// 批次完成并已打包
    RunCompleted {
        session_id: String,
        renditions: usize,
        complete_fragments: usize,
        total_fragments: usize,
    },
    /// 批次中断
    RunFailed {
        session_id: String,
        error: String,
    },
    /// 会话关闭
    SessionClosed {
        session_id: String,
        reason: String,
    },
}

impl WsEvent {
    fn from_progress(session_id: &str, event: ProgressEvent) -> Self {
        let session_id = session_id.to_string();
        match event {
            ProgressEvent::AttemptFailed {
                position,
                label,
                reason,
            } => Self::AttemptFailed {
                session_id,
                position,
                label: label.to_string(),
                reason,
            },
            ProgressEvent::Progress {
                position,
                completed_units,
                total_units,
            } => Self::Progress {
                session_id,
                position,
                completed_units,
                total_units,
            },
            ProgressEvent::RunCompleted {
                renditions,
                complete_fragments,
                total_fragments,
            } => Self::RunCompleted {
                session_id,
                renditions,
                complete_fragments,
                total_fragments,
            },
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<WsEvent>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            session_channels: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.session_channels.get(session_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.session_channels.insert(session_id.to_string(), tx);
        rx
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<WsEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    /// 发布生成过程事件
    pub fn publish_progress(&self, session_id: &str, event: ProgressEvent) {
        self.publish_to_session(session_id, WsEvent::from_progress(session_id, event));
    }

    /// 发布批次失败事件
    pub fn publish_run_failed(&self, session_id: &str, error: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::RunFailed {
                session_id: session_id.to_string(),
                error: error.to_string(),
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &str, event: WsEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// 把编排器的进度事件转发到会话的广播通道
pub struct SessionProgressSink {
    session_id: String,
    publisher: Arc<EventPublisher>,
}

impl SessionProgressSink {
    pub fn new(session_id: impl Into<String>, publisher: Arc<EventPublisher>) -> Self {
        Self {
            session_id: session_id.into(),
            publisher,
        }
    }
}

impl ProgressSinkPort for SessionProgressSink {
    fn report(&self, event: ProgressEvent) {
        self.publisher.publish_progress(&self.session_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::RenditionLabel;

    #[tokio::test]
    async fn test_sink_forwards_to_session_channel() {
        let publisher = EventPublisher::new().arc();
        let mut rx = publisher.register_session("s1");
        let sink = SessionProgressSink::new("s1", publisher.clone());

        sink.report(ProgressEvent::AttemptFailed {
            position: 2,
            label: RenditionLabel::parse("c").unwrap(),
            reason: "Provider returned HTTP 429".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            WsEvent::AttemptFailed {
                session_id: "s1".to_string(),
                position: 2,
                label: "c".to_string(),
                reason: "Provider returned HTTP 429".to_string(),
            }
        );
    }

    #[test]
    fn test_event_wire_format() {
        let event = WsEvent::Progress {
            session_id: "s1".to_string(),
            position: 1,
            completed_units: 3,
            total_units: 6,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Progress");
        assert_eq!(json["data"]["completed_units"], 3);
    }

    #[test]
    fn test_unregistered_session_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish_run_failed("nobody", "boom");
        assert!(publisher.subscribe("nobody").is_none());
    }
}
