//! In-Memory Session Manager Implementation

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::InMemoryRenditionStore;
use crate::application::ports::{
    GenerationSession, SessionError, SessionManagerPort, SessionState,
};
use crate::domain::generation::GenerationRun;

/// 内存会话管理器
pub struct InMemorySessionManager {
    sessions: DashMap<String, GenerationSession>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn update<F>(&self, id: &str, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut GenerationSession) -> Result<(), SessionError>,
    {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        f(session.value_mut())?;
        session.last_activity = Utc::now();
        Ok(())
    }
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn create(&self) -> GenerationSession {
        let now = Utc::now();
        let session = GenerationSession {
            id: Uuid::new_v4().to_string(),
            store: Arc::new(InMemoryRenditionStore::new()),
            state: SessionState::Idle,
            rendition_count: 0,
            last_run: None,
            error: None,
            created_at: now,
            last_activity: now,
        };
        self.sessions.insert(session.id.clone(), session.clone());
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    fn get(&self, id: &str) -> Result<GenerationSession, SessionError> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn mark_queued(&self, id: &str, rendition_count: usize) -> Result<(), SessionError> {
        // get_mut 持有分片写锁，检查与修改是原子的
        self.update(id, |session| {
            if session.state.is_busy() {
                return Err(SessionError::InvalidOperation(format!(
                    "Session {} already has a generation {}",
                    id,
                    session.state.as_str()
                )));
            }
            session.state = SessionState::Queued;
            session.rendition_count = rendition_count;
            session.error = None;
            Ok(())
        })?;
        tracing::debug!(session_id = %id, "Session queued");
        Ok(())
    }

    fn set_state(&self, id: &str, state: SessionState) -> Result<(), SessionError> {
        self.update(id, |session| {
            session.state = state;
            Ok(())
        })?;
        tracing::debug!(session_id = %id, state = state.as_str(), "Session state updated");
        Ok(())
    }

    fn set_run(&self, id: &str, run: GenerationRun) -> Result<(), SessionError> {
        self.update(id, |session| {
            session.last_run = Some(Arc::new(run));
            session.state = SessionState::Completed;
            session.error = None;
            Ok(())
        })
    }

    fn set_failed(&self, id: &str, error: String) -> Result<(), SessionError> {
        self.update(id, |session| {
            session.state = SessionState::Failed;
            session.error = Some(error);
            Ok(())
        })
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| {
                tracing::info!(session_id = %id, "Session closed");
            })
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn touch(&self, id: &str) {
        if let Some(mut session) = self.sessions.get_mut(id) {
            session.last_activity = Utc::now();
        }
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            // 运行中的会话不回收
            .filter(|entry| !entry.state.is_busy())
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity;
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let manager = InMemorySessionManager::new();

        // Create
        let session = manager.create();
        assert_eq!(session.state, SessionState::Idle);
        assert!(manager.is_valid(&session.id));

        // Queue
        manager.mark_queued(&session.id, 3).unwrap();
        let queued = manager.get(&session.id).unwrap();
        assert_eq!(queued.state, SessionState::Queued);
        assert_eq!(queued.rendition_count, 3);

        // Complete
        manager.set_run(&session.id, GenerationRun::new()).unwrap();
        let done = manager.get(&session.id).unwrap();
        assert_eq!(done.state, SessionState::Completed);
        assert!(done.last_run.is_some());

        // Close
        manager.close(&session.id).unwrap();
        assert!(!manager.is_valid(&session.id));
        assert!(matches!(
            manager.get(&session.id),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_busy_session_cannot_be_queued_again() {
        let manager = InMemorySessionManager::new();
        let session = manager.create();

        manager.mark_queued(&session.id, 3).unwrap();
        assert!(matches!(
            manager.mark_queued(&session.id, 3),
            Err(SessionError::InvalidOperation(_))
        ));

        manager.set_state(&session.id, SessionState::Running).unwrap();
        assert!(manager.mark_queued(&session.id, 3).is_err());

        manager.set_failed(&session.id, "boom".to_string()).unwrap();
        manager.mark_queued(&session.id, 2).unwrap();
        assert!(manager.get(&session.id).unwrap().error.is_none());
    }

    #[test]
    fn test_sessions_have_independent_stores() {
        let manager = InMemorySessionManager::new();
        let first = manager.create();
        let second = manager.create();

        first.store.set_fingerprint("first".to_string());

        assert_eq!(first.store.fingerprint().as_deref(), Some("first"));
        assert!(second.store.fingerprint().is_none());
        // 快照共享同一个 store
        assert_eq!(
            manager.get(&first.id).unwrap().store.fingerprint().as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_expired_sessions_skip_busy() {
        let manager = InMemorySessionManager::new();
        let idle = manager.create();
        let busy = manager.create();
        manager.mark_queued(&busy.id, 3).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        let expired = manager.get_expired_sessions(0);

        assert_eq!(expired, vec![idle.id]);
    }
}
