//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{GenerationStatusResponse, RunSummary, VoiceResponse};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListVoicesRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct VoiceDto {
    pub name: String,
    pub voice_id: String,
}

impl From<VoiceResponse> for VoiceDto {
    fn from(voice: VoiceResponse) -> Self {
        Self {
            name: voice.name,
            voice_id: voice.voice_id,
        }
    }
}

// ============================================================================
// Generation DTOs
// ============================================================================

/// 只携带会话 ID 的请求
#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// 提交生成请求
///
/// 未提供的可选参数取配置中的默认值
#[derive(Debug, Deserialize)]
pub struct StartGenerationRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub text: String,
    pub api_key: String,
    pub voice_id: String,
    #[serde(default)]
    pub resume: bool,
    pub model_id: Option<String>,
    pub stability: Option<f32>,
    pub similarity: Option<f32>,
    pub use_speaker_boost: Option<bool>,
    pub max_chars: Option<usize>,
    pub rendition_count: Option<usize>,
    pub pacing_delay_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StartGenerationDto {
    pub session_id: String,
    pub total_fragments: usize,
    pub total_units: usize,
    pub mode: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RunSummaryDto {
    pub run_id: String,
    pub renditions: usize,
    pub complete_fragments: usize,
    pub labels: Vec<String>,
    pub timestamp: String,
}

impl From<RunSummary> for RunSummaryDto {
    fn from(run: RunSummary) -> Self {
        Self {
            run_id: run.run_id,
            renditions: run.renditions,
            complete_fragments: run.complete_fragments,
            labels: run.labels,
            timestamp: run.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationStatusDto {
    pub session_id: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub current_fragment: u32,
    pub total_fragments: u32,
    pub completed_units: usize,
    pub total_units: usize,
    pub rendition_count: usize,
    pub completed_positions: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunSummaryDto>,
}

impl From<GenerationStatusResponse> for GenerationStatusDto {
    fn from(status: GenerationStatusResponse) -> Self {
        Self {
            session_id: status.session_id,
            state: status.state,
            error: status.error,
            current_fragment: status.current_fragment,
            total_fragments: status.total_fragments,
            completed_units: status.completed_units,
            total_units: status.total_units,
            rendition_count: status.rendition_count,
            completed_positions: status.completed_positions,
            run: status.run.map(RunSummaryDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecoverGenerationDto {
    pub session_id: String,
    pub renditions: usize,
    pub complete_fragments: usize,
    pub labels: Vec<String>,
    pub timestamp: String,
}

/// 下载压缩包请求，`label` 缺省时返回合并包
#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub session_id: String,
    #[serde(default)]
    pub label: Option<String>,
}
