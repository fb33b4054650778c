//! Rendition Engine - 单片段多演绎
//!
//! 对一个片段按标签顺序依次请求合成，每次相互独立；
//! 只有全部标签成功才写入缓存并标记完成，部分成功不缓存（下次整体重做）。

use std::sync::Arc;

use crate::application::ports::{
    PacerPort, ProgressEvent, ProgressSinkPort, RenditionStorePort, SynthesisPort,
    SynthesisRequest,
};
use crate::domain::generation::{Fragment, GenerationSettings, Rendition};

/// 演绎引擎
pub struct RenditionEngine {
    synthesis: Arc<dyn SynthesisPort>,
    store: Arc<dyn RenditionStorePort>,
    pacer: Arc<dyn PacerPort>,
    progress: Arc<dyn ProgressSinkPort>,
}

impl RenditionEngine {
    pub fn new(
        synthesis: Arc<dyn SynthesisPort>,
        store: Arc<dyn RenditionStorePort>,
        pacer: Arc<dyn PacerPort>,
        progress: Arc<dyn ProgressSinkPort>,
    ) -> Self {
        Self {
            synthesis,
            store,
            pacer,
            progress,
        }
    }

    /// 生成一个片段的全部演绎
    ///
    /// 返回按标签排序的成功演绎，部分失败时数量少于 `rendition_count`
    pub async fn render(&self, fragment: &Fragment, settings: &GenerationSettings) -> Vec<Rendition> {
        let expected = settings.rendition_count;

        // 缓存命中：不发起任何调用
        if self.store.has_complete(fragment.position) {
            let cached = self.store.get_renditions(fragment.position);
            if cached.len() == expected {
                tracing::debug!(position = fragment.position, "Cache hit, skipping synthesis");
                return cached;
            }
            tracing::warn!(
                position = fragment.position,
                cached = cached.len(),
                expected = expected,
                "Cached rendition set has wrong size, regenerating"
            );
        }

        let request = SynthesisRequest::from_settings(fragment.text.clone(), settings);
        let mut renditions = Vec::with_capacity(expected);

        for label in settings.labels() {
            self.pacer.wait_turn().await;

            match self.synthesis.synthesize(&request).await {
                Ok(audio) => {
                    self.pacer.record_success();
                    tracing::debug!(
                        position = fragment.position,
                        label = %label,
                        audio_size = audio.len(),
                        "Rendition synthesized"
                    );
                    renditions.push(Rendition::new(fragment, label, audio));
                }
                Err(e) => {
                    tracing::warn!(
                        position = fragment.position,
                        label = %label,
                        error = %e,
                        "Rendition attempt failed, skipping"
                    );
                    self.progress.report(ProgressEvent::AttemptFailed {
                        position: fragment.position,
                        label,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if renditions.len() == expected {
            self.store.record_complete(fragment.position, renditions.clone());
            tracing::info!(position = fragment.position, "Fragment complete, cached");
        } else {
            tracing::info!(
                position = fragment.position,
                succeeded = renditions.len(),
                expected = expected,
                "Fragment partially rendered, not cached"
            );
        }

        renditions
    }
}
