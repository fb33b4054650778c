//! Generation Orchestrator - 生成编排
//!
//! 切分文本 -> 按顺序逐片段调用演绎引擎（先查缓存）-> 打包，并上报进度。
//! 片段之间、演绎之间严格串行，不发起任何并发合成调用。

use std::sync::Arc;

use super::RenditionEngine;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArchivePackagerPort, PacerPort, ProgressEvent, ProgressSinkPort, RenditionStorePort,
    SynthesisPort,
};
use crate::domain::fragment_text;
use crate::domain::generation::{Fragment, GenerationError, GenerationRun, GenerationSettings};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 新提交：清空缓存
    Fresh,
    /// 重跑：复用缓存中已完成的片段（指纹不符时退化为 Fresh）
    Resume,
}

/// 生成编排器
pub struct GenerationOrchestrator {
    engine: RenditionEngine,
    store: Arc<dyn RenditionStorePort>,
    packager: Arc<dyn ArchivePackagerPort>,
    progress: Arc<dyn ProgressSinkPort>,
}

impl GenerationOrchestrator {
    pub fn new(
        synthesis: Arc<dyn SynthesisPort>,
        store: Arc<dyn RenditionStorePort>,
        pacer: Arc<dyn PacerPort>,
        packager: Arc<dyn ArchivePackagerPort>,
        progress: Arc<dyn ProgressSinkPort>,
    ) -> Self {
        Self {
            engine: RenditionEngine::new(synthesis, store.clone(), pacer, progress.clone()),
            store,
            packager,
            progress,
        }
    }

    /// 校验参数并切分文本
    ///
    /// 任何配置错误都在处理片段之前返回
    pub fn prepare(text: &str, settings: &GenerationSettings) -> Result<Vec<Fragment>, ApplicationError> {
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyText.into());
        }
        settings.validate()?;

        let fragments = fragment_text(text, settings.max_chars);
        if fragments.is_empty() {
            return Err(GenerationError::EmptyText.into());
        }
        Ok(fragments)
    }

    /// 执行一次完整的生成
    pub async fn run(
        &self,
        text: &str,
        settings: &GenerationSettings,
        mode: RunMode,
    ) -> Result<GenerationRun, ApplicationError> {
        let fragments = Self::prepare(text, settings)?;
        self.prepare_store(text, settings, mode);

        let total_fragments = fragments.len();
        let units_per_fragment = settings.rendition_count;
        let total_units = total_fragments * units_per_fragment;
        self.store.set_progress(0, total_fragments as u32);

        tracing::info!(
            fragments = total_fragments,
            renditions_per_fragment = units_per_fragment,
            mode = ?mode,
            "Generation run started"
        );

        let mut run = GenerationRun::new();

        for (i, fragment) in fragments.iter().enumerate() {
            let renditions = self.engine.render(fragment, settings).await;
            if renditions.len() == units_per_fragment {
                run.mark_fragment_complete(fragment.position);
            }
            run.add_renditions(renditions);

            let processed = i + 1;
            self.store.set_progress(processed as u32, total_fragments as u32);
            self.progress.report(ProgressEvent::Progress {
                position: fragment.position,
                completed_units: processed * units_per_fragment,
                total_units,
            });
        }

        let archives = self.packager.package_by_rendition(&run.renditions())?;
        run.complete(archives);

        tracing::info!(
            run_id = %run.id(),
            renditions = run.rendition_count(),
            complete_fragments = run.complete_positions().len(),
            total_fragments = total_fragments,
            "Generation run completed"
        );
        self.progress.report(ProgressEvent::RunCompleted {
            renditions: run.rendition_count(),
            complete_fragments: run.complete_positions().len(),
            total_fragments,
        });

        Ok(run)
    }

    /// 从缓存恢复上一次未完成的生成
    pub fn recover(&self) -> Result<GenerationRun, ApplicationError> {
        recover_run(self.store.as_ref(), self.packager.as_ref())
    }

    fn prepare_store(&self, text: &str, settings: &GenerationSettings, mode: RunMode) {
        let fingerprint = settings.fingerprint(text);

        let reuse = match mode {
            RunMode::Fresh => false,
            RunMode::Resume => {
                let matches = self.store.fingerprint().as_deref() == Some(fingerprint.as_str());
                if !matches {
                    tracing::info!("Submission changed since last run, starting fresh");
                }
                matches
            }
        };

        if !reuse {
            self.store.reset();
        }
        self.store.set_fingerprint(fingerprint);
    }
}

/// 用所有已缓存的演绎重建批次并重新打包
///
/// 不发起任何合成调用；缓存为空时返回 NotFound
pub fn recover_run(
    store: &dyn RenditionStorePort,
    packager: &dyn ArchivePackagerPort,
) -> Result<GenerationRun, ApplicationError> {
    let cached = store.all_renditions();
    if cached.is_empty() {
        return Err(ApplicationError::not_found("Cached renditions", "session"));
    }

    let mut run = GenerationRun::new();
    for position in store.completed_positions() {
        run.mark_fragment_complete(position);
    }
    run.add_renditions(cached);

    let archives = packager.package_by_rendition(&run.renditions())?;
    run.restamp();
    run.complete(archives);

    tracing::info!(
        run_id = %run.id(),
        renditions = run.rendition_count(),
        "Generation recovered from cache"
    );

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::domain::generation::RenditionLabel;
    use crate::infrastructure::adapters::{
        FakeOutcome, FakeSynthesisClient, FixedIntervalPacer, ZipArchivePackager,
    };
    use crate::infrastructure::memory::InMemoryRenditionStore;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        fn progress_units(&self) -> Vec<(usize, usize)> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    ProgressEvent::Progress {
                        completed_units,
                        total_units,
                        ..
                    } => Some((*completed_units, *total_units)),
                    _ => None,
                })
                .collect()
        }
    }

    impl ProgressSinkPort for RecordingSink {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    struct Fixture {
        client: Arc<FakeSynthesisClient>,
        store: Arc<InMemoryRenditionStore>,
        sink: Arc<RecordingSink>,
        orchestrator: GenerationOrchestrator,
    }

    fn fixture() -> Fixture {
        let client = Arc::new(FakeSynthesisClient::with_defaults());
        let store = Arc::new(InMemoryRenditionStore::new());
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = GenerationOrchestrator::new(
            client.clone(),
            store.clone(),
            Arc::new(FixedIntervalPacer::new(Duration::ZERO)),
            Arc::new(ZipArchivePackager::new()),
            sink.clone(),
        );
        Fixture {
            client,
            store,
            sink,
            orchestrator,
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings::new("key", "voice")
    }

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_single_fragment_run() {
        let f = fixture();

        let run = f
            .orchestrator
            .run("Hello world. This is a test.", &settings(), RunMode::Fresh)
            .await
            .unwrap();

        assert!(run.is_complete());
        assert_eq!(run.rendition_count(), 3);
        assert_eq!(run.complete_positions().len(), 1);

        let archives = run.archives().unwrap();
        assert_eq!(archives.len(), 3);
        let a = archives.get(RenditionLabel::from_index(0).unwrap()).unwrap();
        assert_eq!(entry_names(a), vec!["1.mp3"]);

        assert_eq!(f.store.progress().current_fragment, 1);
        assert_eq!(f.store.progress().total_fragments, 1);
    }

    #[tokio::test]
    async fn test_configuration_errors_halt_before_any_call() {
        let f = fixture();

        let err = f.orchestrator.run("   \n ", &settings(), RunMode::Fresh).await.unwrap_err();
        assert!(err.is_configuration());

        let mut no_key = settings();
        no_key.api_key.clear();
        let err = f.orchestrator.run("Texto.", &no_key, RunMode::Fresh).await.unwrap_err();
        assert!(err.is_configuration());

        assert_eq!(f.client.calls(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_advances_progress_by_full_count() {
        // 场景 C：前两次 200，第三次 429
        let f = fixture();
        f.client.push_outcomes([
            FakeOutcome::audio(b"a".to_vec()),
            FakeOutcome::audio(b"b".to_vec()),
            FakeOutcome::status(429),
        ]);

        let run = f
            .orchestrator
            .run("Una sola frase.", &settings(), RunMode::Fresh)
            .await
            .unwrap();

        assert_eq!(run.rendition_count(), 2);
        assert!(run.complete_positions().is_empty());
        assert!(run.is_complete());
        assert!(!f.store.has_complete(1));
        assert!(f.store.all_renditions().is_empty());
        assert_eq!(f.sink.progress_units(), vec![(3, 3)]);

        // 只有 a、b 两个包
        let labels: Vec<char> = run
            .archives()
            .unwrap()
            .labels()
            .iter()
            .map(|l| l.as_char())
            .collect();
        assert_eq!(labels, vec!['a', 'b']);
    }

    #[tokio::test]
    async fn test_resume_retries_partial_then_serves_from_cache() {
        // 场景 C -> D
        let f = fixture();
        let text = "Una sola frase.";
        f.client.push_outcomes([
            FakeOutcome::audio(b"a".to_vec()),
            FakeOutcome::audio(b"b".to_vec()),
            FakeOutcome::status(429),
        ]);
        f.orchestrator.run(text, &settings(), RunMode::Fresh).await.unwrap();
        assert_eq!(f.client.calls(), 3);

        // 第二次：提供方全部返回 200
        let run = f.orchestrator.run(text, &settings(), RunMode::Resume).await.unwrap();
        assert_eq!(f.client.calls(), 6);
        assert_eq!(run.rendition_count(), 3);
        assert!(f.store.has_complete(1));

        // 第三次：零调用
        let again = f.orchestrator.run(text, &settings(), RunMode::Resume).await.unwrap();
        assert_eq!(f.client.calls(), 6);
        assert_eq!(again.renditions(), run.renditions());
    }

    #[tokio::test]
    async fn test_fresh_mode_discards_cache() {
        let f = fixture();
        let text = "Frase.";
        f.orchestrator.run(text, &settings(), RunMode::Fresh).await.unwrap();
        f.orchestrator.run(text, &settings(), RunMode::Fresh).await.unwrap();
        assert_eq!(f.client.calls(), 6);
    }

    #[tokio::test]
    async fn test_resume_with_changed_text_starts_fresh() {
        let f = fixture();
        f.orchestrator.run("Primera.", &settings(), RunMode::Fresh).await.unwrap();
        f.orchestrator.run("Segunda.", &settings(), RunMode::Resume).await.unwrap();
        assert_eq!(f.client.calls(), 6);
        assert_eq!(f.store.all_renditions()[0].text, "Segunda.");
    }

    #[tokio::test]
    async fn test_multi_fragment_packaging() {
        let f = fixture();
        // 第 2 个片段的 b 失败
        f.client.push_outcomes([
            FakeOutcome::audio(b"1a".to_vec()),
            FakeOutcome::audio(b"1b".to_vec()),
            FakeOutcome::audio(b"1c".to_vec()),
            FakeOutcome::audio(b"2a".to_vec()),
            FakeOutcome::transport("timeout"),
            FakeOutcome::audio(b"2c".to_vec()),
        ]);

        let run = f
            .orchestrator
            .run("Primer párrafo.\nSegundo párrafo.", &settings(), RunMode::Fresh)
            .await
            .unwrap();

        assert_eq!(run.rendition_count(), 5);
        assert_eq!(run.complete_positions().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(f.sink.progress_units(), vec![(3, 6), (6, 6)]);

        let archives = run.archives().unwrap();
        let b = archives.get(RenditionLabel::parse("b").unwrap()).unwrap();
        assert_eq!(entry_names(b), vec!["1.mp3"]);
        let c = archives.get(RenditionLabel::parse("c").unwrap()).unwrap();
        assert_eq!(entry_names(c), vec!["1.mp3", "2.mp3"]);

        let mut zip = zip::ZipArchive::new(Cursor::new(c)).unwrap();
        let mut content = Vec::new();
        zip.by_name("2.mp3").unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"2c".to_vec());
    }

    #[tokio::test]
    async fn test_recover_rebuilds_run_from_cache() {
        let f = fixture();
        assert!(matches!(
            f.orchestrator.recover(),
            Err(ApplicationError::NotFound { .. })
        ));

        f.orchestrator
            .run("Uno.\nDos.", &settings(), RunMode::Fresh)
            .await
            .unwrap();

        let recovered = f.orchestrator.recover().unwrap();
        assert!(recovered.is_complete());
        assert_eq!(recovered.rendition_count(), 6);
        assert_eq!(recovered.complete_positions().len(), 2);
        assert_eq!(f.client.calls(), 6);
    }
}
