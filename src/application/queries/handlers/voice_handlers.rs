//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SynthesisPort;
use crate::application::queries::ListVoices;

// ============================================================================
// Response DTOs
// ============================================================================

/// 音色响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResponse {
    pub name: String,
    pub voice_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListVoices Handler
///
/// 服务端返回空列表（包括 key 无效、网络失败）时视为配置错误
pub struct ListVoicesHandler {
    synthesis: Arc<dyn SynthesisPort>,
}

impl ListVoicesHandler {
    pub fn new(synthesis: Arc<dyn SynthesisPort>) -> Self {
        Self { synthesis }
    }

    pub async fn handle(&self, query: ListVoices) -> Result<Vec<VoiceResponse>, ApplicationError> {
        if query.api_key.trim().is_empty() {
            return Err(ApplicationError::configuration("API key is required"));
        }

        let voices = self.synthesis.list_voices(&query.api_key).await;
        if voices.is_empty() {
            return Err(ApplicationError::configuration(
                "No voices available, check the API key",
            ));
        }

        Ok(voices
            .into_iter()
            .map(|(name, voice_id)| VoiceResponse { name, voice_id })
            .collect())
    }
}
