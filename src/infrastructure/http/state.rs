//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::{
    // Command handlers
    CloseGenerationHandler, RecoverGenerationHandler, StartGenerationHandler,
    // Query handlers
    GetArchiveHandler, GetGenerationStatusHandler, ListVoicesHandler,
    // Ports
    ArchivePackagerPort, GenerationJob, SessionManagerPort, SynthesisPort,
};
use crate::config::GenerationConfig;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    /// 请求未指定参数时使用的默认值
    pub generation_config: GenerationConfig,

    // ========== Command Handlers ==========
    pub start_generation_handler: StartGenerationHandler,
    pub recover_generation_handler: RecoverGenerationHandler,
    pub close_generation_handler: CloseGenerationHandler,

    // ========== Query Handlers ==========
    pub list_voices_handler: ListVoicesHandler,
    pub get_generation_status_handler: GetGenerationStatusHandler,
    pub get_archive_handler: GetArchiveHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        synthesis: Arc<dyn SynthesisPort>,
        packager: Arc<dyn ArchivePackagerPort>,
        event_publisher: Arc<EventPublisher>,
        job_sender: mpsc::Sender<GenerationJob>,
        generation_config: GenerationConfig,
    ) -> Self {
        Self {
            session_manager: session_manager.clone(),
            event_publisher,
            generation_config,

            // Command handlers
            start_generation_handler: StartGenerationHandler::new(
                synthesis.clone(),
                session_manager.clone(),
                job_sender,
            ),
            recover_generation_handler: RecoverGenerationHandler::new(
                session_manager.clone(),
                packager.clone(),
            ),
            close_generation_handler: CloseGenerationHandler::new(session_manager.clone()),

            // Query handlers
            list_voices_handler: ListVoicesHandler::new(synthesis),
            get_generation_status_handler: GetGenerationStatusHandler::new(
                session_manager.clone(),
            ),
            get_archive_handler: GetArchiveHandler::new(session_manager, packager),
        }
    }
}
