//! Generation Command Handlers

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::commands::generation_commands::*;
use crate::application::error::ApplicationError;
use crate::application::generation::{recover_run, GenerationOrchestrator, RunMode};
use crate::application::ports::{ArchivePackagerPort, SessionManagerPort, SynthesisPort};

/// StartGeneration Handler - 校验并提交生成任务
///
/// 先用 API key 拉取音色列表：列表为空或音色不在其中都视为配置错误，不入队
pub struct StartGenerationHandler {
    synthesis: Arc<dyn SynthesisPort>,
    session_manager: Arc<dyn SessionManagerPort>,
    job_sender: mpsc::Sender<GenerationJob>,
}

impl StartGenerationHandler {
    pub fn new(
        synthesis: Arc<dyn SynthesisPort>,
        session_manager: Arc<dyn SessionManagerPort>,
        job_sender: mpsc::Sender<GenerationJob>,
    ) -> Self {
        Self {
            synthesis,
            session_manager,
            job_sender,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartGenerationCommand,
    ) -> Result<StartGenerationResponse, ApplicationError> {
        let fragments = GenerationOrchestrator::prepare(&cmd.text, &cmd.settings)?;

        let voices = self.synthesis.list_voices(&cmd.settings.api_key).await;
        if voices.is_empty() {
            tracing::error!("Voice listing returned nothing, refusing to start");
            return Err(ApplicationError::configuration(
                "No usable voices for this API key",
            ));
        }
        if !voices.values().any(|id| id == &cmd.settings.voice_id) {
            return Err(ApplicationError::configuration(format!(
                "Unknown voice: {}",
                cmd.settings.voice_id
            )));
        }

        let (session, existed) = match &cmd.session_id {
            Some(id) => (self.session_manager.get(id)?, true),
            None => (self.session_manager.create(), false),
        };

        let mode = if cmd.resume && existed {
            RunMode::Resume
        } else {
            RunMode::Fresh
        };

        self.session_manager
            .mark_queued(&session.id, cmd.settings.rendition_count)?;

        let total_fragments = fragments.len();
        let total_units = total_fragments * cmd.settings.rendition_count;

        let job = GenerationJob {
            session_id: session.id.clone(),
            text: cmd.text,
            settings: cmd.settings,
            mode,
        };

        if let Err(e) = self.job_sender.try_send(job) {
            tracing::error!(session_id = %session.id, error = %e, "Failed to enqueue generation");
            if let Err(e) = self
                .session_manager
                .set_failed(&session.id, format!("Queue error: {}", e))
            {
                tracing::error!(session_id = %session.id, error = %e, "Failed to record failure");
            }
            return Err(ApplicationError::internal(format!(
                "Failed to enqueue generation: {}",
                e
            )));
        }

        tracing::info!(
            session_id = %session.id,
            fragments = total_fragments,
            mode = ?mode,
            "Generation queued"
        );

        Ok(StartGenerationResponse {
            session_id: session.id,
            total_fragments,
            total_units,
            mode,
        })
    }
}

/// RecoverGeneration Handler - 从会话缓存重建上一次生成
pub struct RecoverGenerationHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    packager: Arc<dyn ArchivePackagerPort>,
}

impl RecoverGenerationHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        packager: Arc<dyn ArchivePackagerPort>,
    ) -> Self {
        Self {
            session_manager,
            packager,
        }
    }

    pub fn handle(
        &self,
        cmd: RecoverGenerationCommand,
    ) -> Result<RecoverGenerationResponse, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        if session.state.is_busy() {
            return Err(ApplicationError::invalid_state(
                "Generation still in progress",
            ));
        }

        // 已完成的批次直接返回
        let run = match session.last_run.as_deref() {
            Some(run) if run.is_complete() => run.clone(),
            _ => {
                let run = recover_run(session.store.as_ref(), self.packager.as_ref())?;
                self.session_manager.set_run(&session.id, run.clone())?;
                run
            }
        };

        Ok(RecoverGenerationResponse {
            session_id: session.id,
            renditions: run.rendition_count(),
            complete_fragments: run.complete_positions().len(),
            labels: run.labels().into_iter().collect(),
            timestamp: run.timestamp_label(),
        })
    }
}

/// CloseGeneration Handler - 关闭会话
///
/// 正在运行的生成不会被取消，其结果在完成时被丢弃
pub struct CloseGenerationHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl CloseGenerationHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(
        &self,
        cmd: CloseGenerationCommand,
    ) -> Result<CloseGenerationResponse, ApplicationError> {
        self.session_manager.close(&cmd.session_id)?;
        Ok(CloseGenerationResponse {
            session_id: cmd.session_id,
        })
    }
}
