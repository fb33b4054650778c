//! Generation Worker - Background Generation Run Processor

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use crate::application::commands::GenerationJob;
use crate::application::generation::GenerationOrchestrator;
use crate::application::ports::{
    ArchivePackagerPort, SessionManagerPort, SessionState, SynthesisPort,
};
use crate::infrastructure::adapters::FixedIntervalPacer;
use crate::infrastructure::events::{EventPublisher, SessionProgressSink};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerationWorkerConfig {
    /// 同时运行的生成批次上限（跨会话）
    pub max_concurrent: usize,
}

impl Default for GenerationWorkerConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

/// 生成 Worker
///
/// 从队列消费生成任务；不同会话的批次可以并行，单个批次内部严格串行
pub struct GenerationWorker {
    config: GenerationWorkerConfig,
    queue_receiver: mpsc::Receiver<GenerationJob>,
    session_manager: Arc<dyn SessionManagerPort>,
    synthesis: Arc<dyn SynthesisPort>,
    packager: Arc<dyn ArchivePackagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl GenerationWorker {
    pub fn new(
        config: GenerationWorkerConfig,
        queue_receiver: mpsc::Receiver<GenerationJob>,
        session_manager: Arc<dyn SessionManagerPort>,
        synthesis: Arc<dyn SynthesisPort>,
        packager: Arc<dyn ArchivePackagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            session_manager,
            synthesis,
            packager,
            event_publisher,
        }
    }

    /// 启动 Worker
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent = self.config.max_concurrent,
            "GenerationWorker started"
        );

        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));

        while let Some(job) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    continue;
                }
            };

            let session_manager = self.session_manager.clone();
            let synthesis = self.synthesis.clone();
            let packager = self.packager.clone();
            let event_publisher = self.event_publisher.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到批次完成

                Self::process_job(job, session_manager, synthesis, packager, event_publisher)
                    .await;
            });
        }

        tracing::info!("GenerationWorker stopped");
    }

    /// 处理单个生成任务
    async fn process_job(
        job: GenerationJob,
        session_manager: Arc<dyn SessionManagerPort>,
        synthesis: Arc<dyn SynthesisPort>,
        packager: Arc<dyn ArchivePackagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) {
        let session_id = job.session_id.clone();

        let session = match session_manager.get(&session_id) {
            Ok(session) => session,
            Err(_) => {
                tracing::debug!(session_id = %session_id, "Session closed before start, skipping");
                return;
            }
        };

        if let Err(e) = session_manager.set_state(&session_id, SessionState::Running) {
            tracing::error!(session_id = %session_id, error = %e, "Failed to update session state");
            return;
        }

        // 每个批次独立的节流器
        let pacer = Arc::new(FixedIntervalPacer::new(job.settings.pacing_delay));
        let sink = Arc::new(SessionProgressSink::new(
            session_id.clone(),
            event_publisher.clone(),
        ));
        let orchestrator =
            GenerationOrchestrator::new(synthesis, session.store.clone(), pacer, packager, sink);

        let result = orchestrator.run(&job.text, &job.settings, job.mode).await;

        // 批次结束后再次检查会话是否有效
        if !session_manager.is_valid(&session_id) {
            tracing::debug!(session_id = %session_id, "Session closed during run, dropping result");
            return;
        }

        match result {
            Ok(run) => {
                tracing::info!(
                    session_id = %session_id,
                    run_id = %run.id(),
                    renditions = run.rendition_count(),
                    "Generation finished"
                );
                if let Err(e) = session_manager.set_run(&session_id, run) {
                    tracing::error!(session_id = %session_id, error = %e, "Failed to store run");
                }
            }
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Generation failed");
                let message = e.to_string();
                if let Err(e) = session_manager.set_failed(&session_id, message.clone()) {
                    tracing::error!(session_id = %session_id, error = %e, "Failed to record failure");
                }
                event_publisher.publish_run_failed(&session_id, &message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::generation::RunMode;
    use crate::domain::generation::{GenerationSettings, MIN_PACING_DELAY_MS};
    use crate::infrastructure::adapters::{FakeSynthesisClient, ZipArchivePackager};
    use crate::infrastructure::events::WsEvent;
    use crate::infrastructure::memory::InMemorySessionManager;

    struct Fixture {
        sessions: Arc<InMemorySessionManager>,
        publisher: Arc<EventPublisher>,
        sender: mpsc::Sender<GenerationJob>,
    }

    fn start_worker() -> Fixture {
        let sessions = Arc::new(InMemorySessionManager::new());
        let publisher = EventPublisher::new().arc();
        let (sender, receiver) = mpsc::channel(8);
        let worker = GenerationWorker::new(
            GenerationWorkerConfig::default(),
            receiver,
            sessions.clone(),
            Arc::new(FakeSynthesisClient::with_defaults()),
            Arc::new(ZipArchivePackager::new()),
            publisher.clone(),
        );
        tokio::spawn(worker.run());
        Fixture {
            sessions,
            publisher,
            sender,
        }
    }

    fn job(session_id: &str, text: &str) -> GenerationJob {
        let mut settings = GenerationSettings::new("key", "voice");
        settings.pacing_delay = Duration::from_millis(MIN_PACING_DELAY_MS);
        GenerationJob {
            session_id: session_id.to_string(),
            text: text.to_string(),
            settings,
            mode: RunMode::Fresh,
        }
    }

    async fn wait_for_state(
        sessions: &InMemorySessionManager,
        id: &str,
        state: SessionState,
    ) -> bool {
        for _ in 0..1000 {
            if sessions.get(id).ok().map(|s| s.state) == Some(state) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_completes_and_publishes_events() {
        let f = start_worker();
        let session = f.sessions.create();
        let mut events = f.publisher.register_session(&session.id);
        f.sessions.mark_queued(&session.id, 3).unwrap();

        f.sender.send(job(&session.id, "Uno.\nDos.")).await.unwrap();

        assert!(wait_for_state(&f.sessions, &session.id, SessionState::Completed).await);
        let done = f.sessions.get(&session.id).unwrap();
        assert_eq!(done.last_run.unwrap().rendition_count(), 6);

        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WsEvent::RunCompleted { renditions: 6, .. }) {
                completed = true;
            }
        }
        assert!(completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_job_marks_session_failed() {
        let f = start_worker();
        let session = f.sessions.create();
        f.sessions.mark_queued(&session.id, 3).unwrap();

        f.sender.send(job(&session.id, "   ")).await.unwrap();

        assert!(wait_for_state(&f.sessions, &session.id, SessionState::Failed).await);
        assert!(f.sessions.get(&session.id).unwrap().error.is_some());
    }
}
