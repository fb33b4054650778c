//! Generation Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArchivePackagerPort, SessionManagerPort};
use crate::application::queries::{GetArchive, GetArchiveResponse, GetGenerationStatus};
use crate::domain::generation::GenerationRun;

// ============================================================================
// Response DTOs
// ============================================================================

/// 批次摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub renditions: usize,
    pub complete_fragments: usize,
    pub labels: Vec<String>,
    pub timestamp: String,
}

impl From<&GenerationRun> for RunSummary {
    fn from(run: &GenerationRun) -> Self {
        Self {
            run_id: run.id().to_string(),
            renditions: run.rendition_count(),
            complete_fragments: run.complete_positions().len(),
            labels: run.labels().iter().map(|l| l.to_string()).collect(),
            timestamp: run.timestamp_label(),
        }
    }
}

/// 生成状态响应
#[derive(Debug, Clone)]
pub struct GenerationStatusResponse {
    pub session_id: String,
    pub state: String,
    pub error: Option<String>,
    pub current_fragment: u32,
    pub total_fragments: u32,
    pub completed_units: usize,
    pub total_units: usize,
    pub rendition_count: usize,
    pub completed_positions: Vec<u32>,
    pub run: Option<RunSummary>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetGenerationStatus Handler
pub struct GetGenerationStatusHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetGenerationStatusHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub fn handle(
        &self,
        query: GetGenerationStatus,
    ) -> Result<GenerationStatusResponse, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        let progress = session.store.progress();
        let per_fragment = session.rendition_count;

        Ok(GenerationStatusResponse {
            session_id: session.id,
            state: session.state.as_str().to_string(),
            error: session.error,
            current_fragment: progress.current_fragment,
            total_fragments: progress.total_fragments,
            completed_units: progress.current_fragment as usize * per_fragment,
            total_units: progress.total_fragments as usize * per_fragment,
            rendition_count: per_fragment,
            completed_positions: session.store.completed_positions().into_iter().collect(),
            run: session.last_run.as_deref().map(RunSummary::from),
        })
    }
}

/// GetArchive Handler - 获取按标签或合并的压缩包
pub struct GetArchiveHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    packager: Arc<dyn ArchivePackagerPort>,
}

impl GetArchiveHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        packager: Arc<dyn ArchivePackagerPort>,
    ) -> Self {
        Self {
            session_manager,
            packager,
        }
    }

    pub fn handle(&self, query: GetArchive) -> Result<GetArchiveResponse, ApplicationError> {
        let session = self.session_manager.get(&query.session_id)?;
        let run = session
            .last_run
            .filter(|run| run.is_complete())
            .ok_or_else(|| ApplicationError::invalid_state("No completed generation"))?;
        let timestamp = run.timestamp_label();

        let (file_name, data) = match query.label {
            Some(label) => {
                let data = run
                    .archives()
                    .and_then(|group| group.get(label))
                    .ok_or_else(|| ApplicationError::not_found("Archive", label.to_string()))?;
                (
                    format!("audios_version_{}_{}.zip", label, timestamp),
                    data.to_vec(),
                )
            }
            None => {
                let data = self.packager.package_combined(&run.renditions())?;
                (format!("audios_all_{}.zip", timestamp), data)
            }
        };

        Ok(GetArchiveResponse {
            file_name,
            data,
            content_type: "application/zip".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SessionState;
    use crate::domain::generation::{Fragment, Rendition, RenditionLabel};
    use crate::infrastructure::adapters::ZipArchivePackager;
    use crate::infrastructure::memory::InMemorySessionManager;

    fn completed_session(sessions: &InMemorySessionManager) -> String {
        let session = sessions.create();
        let packager = ZipArchivePackager::new();
        let fragment = Fragment::new(1, "Uno.");
        let renditions: Vec<Rendition> = RenditionLabel::first(2)
            .into_iter()
            .map(|label| Rendition::new(&fragment, label, vec![label.index() as u8]))
            .collect();

        let mut run = GenerationRun::new();
        run.mark_fragment_complete(1);
        run.add_renditions(renditions.clone());
        run.complete(packager.package_by_rendition(&renditions).unwrap());

        sessions.mark_queued(&session.id, 2).unwrap();
        sessions.set_run(&session.id, run).unwrap();
        session.id
    }

    #[test]
    fn test_status_of_fresh_session() {
        let sessions = Arc::new(InMemorySessionManager::new());
        let session = sessions.create();

        let status = GetGenerationStatusHandler::new(sessions)
            .handle(GetGenerationStatus {
                session_id: session.id,
            })
            .unwrap();

        assert_eq!(status.state, "idle");
        assert_eq!(status.total_units, 0);
        assert!(status.run.is_none());
    }

    #[test]
    fn test_status_reports_units() {
        let sessions = Arc::new(InMemorySessionManager::new());
        let session = sessions.create();
        sessions.mark_queued(&session.id, 3).unwrap();
        session.store.set_progress(2, 5);

        let status = GetGenerationStatusHandler::new(sessions)
            .handle(GetGenerationStatus {
                session_id: session.id,
            })
            .unwrap();

        assert_eq!(status.state, SessionState::Queued.as_str());
        assert_eq!(status.completed_units, 6);
        assert_eq!(status.total_units, 15);
    }

    #[test]
    fn test_archive_by_label_and_combined() {
        let sessions = Arc::new(InMemorySessionManager::new());
        let id = completed_session(&sessions);
        let handler = GetArchiveHandler::new(sessions, Arc::new(ZipArchivePackager::new()));

        let single = handler
            .handle(GetArchive {
                session_id: id.clone(),
                label: Some(RenditionLabel::parse("b").unwrap()),
            })
            .unwrap();
        assert!(single.file_name.starts_with("audios_version_b_"));
        assert!(single.file_name.ends_with(".zip"));
        assert_eq!(single.content_type, "application/zip");

        let all = handler
            .handle(GetArchive {
                session_id: id,
                label: None,
            })
            .unwrap();
        assert!(all.file_name.starts_with("audios_all_"));
        assert!(!all.data.is_empty());
    }

    #[test]
    fn test_archive_missing_label() {
        let sessions = Arc::new(InMemorySessionManager::new());
        let id = completed_session(&sessions);
        let handler = GetArchiveHandler::new(sessions, Arc::new(ZipArchivePackager::new()));

        let err = handler
            .handle(GetArchive {
                session_id: id,
                label: Some(RenditionLabel::parse("z").unwrap()),
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[test]
    fn test_archive_before_completion() {
        let sessions = Arc::new(InMemorySessionManager::new());
        let session = sessions.create();
        let handler = GetArchiveHandler::new(sessions, Arc::new(ZipArchivePackager::new()));

        let err = handler
            .handle(GetArchive {
                session_id: session.id,
                label: None,
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidState(_)));
    }
}
