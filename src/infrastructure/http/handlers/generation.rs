//! Generation HTTP Handlers
//!
//! 提交、查询、恢复、下载与关闭

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    CloseGenerationCommand, GetArchive, GetGenerationStatus, RecoverGenerationCommand, RunMode,
    StartGenerationCommand,
};
use crate::domain::generation::{GenerationSettings, RenditionLabel};
use crate::infrastructure::http::dto::{
    ApiResponse, ArchiveRequest, Empty, GenerationStatusDto, RecoverGenerationDto,
    SessionRequest, StartGenerationDto, StartGenerationRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 以配置默认值为基础，叠加请求中显式给出的参数
fn build_settings(state: &AppState, req: &mut StartGenerationRequest) -> GenerationSettings {
    let mut settings = state.generation_config.settings(
        std::mem::take(&mut req.api_key),
        std::mem::take(&mut req.voice_id),
    );

    if let Some(model_id) = req.model_id.take() {
        settings.model_id = model_id;
    }
    if let Some(stability) = req.stability {
        settings.voice.stability = stability;
    }
    if let Some(similarity) = req.similarity {
        settings.voice.similarity = similarity;
    }
    if let Some(boost) = req.use_speaker_boost {
        settings.voice.use_speaker_boost = boost;
    }
    if let Some(max_chars) = req.max_chars {
        settings.max_chars = max_chars;
    }
    if let Some(count) = req.rendition_count {
        settings.rendition_count = count;
    }
    if let Some(delay) = req.pacing_delay_ms {
        settings.pacing_delay = Duration::from_millis(delay);
    }
    settings
}

/// 提交生成任务
pub async fn start_generation(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<StartGenerationRequest>,
) -> Result<Json<ApiResponse<StartGenerationDto>>, ApiError> {
    let settings = build_settings(&state, &mut req);

    let response = state
        .start_generation_handler
        .handle(StartGenerationCommand {
            session_id: req.session_id,
            text: req.text,
            settings,
            resume: req.resume,
        })
        .await?;

    Ok(Json(ApiResponse::success(StartGenerationDto {
        session_id: response.session_id,
        total_fragments: response.total_fragments,
        total_units: response.total_units,
        mode: match response.mode {
            RunMode::Fresh => "fresh",
            RunMode::Resume => "resume",
        },
    })))
}

/// 查询生成进度
pub async fn generation_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<GenerationStatusDto>>, ApiError> {
    state.session_manager.touch(&req.session_id);

    let status = state
        .get_generation_status_handler
        .handle(GetGenerationStatus {
            session_id: req.session_id,
        })?;

    Ok(Json(ApiResponse::success(status.into())))
}

/// 从缓存恢复上一次生成
pub async fn recover_generation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<RecoverGenerationDto>>, ApiError> {
    state.session_manager.touch(&req.session_id);

    let response = state
        .recover_generation_handler
        .handle(RecoverGenerationCommand {
            session_id: req.session_id,
        })?;

    Ok(Json(ApiResponse::success(RecoverGenerationDto {
        session_id: response.session_id,
        renditions: response.renditions,
        complete_fragments: response.complete_fragments,
        labels: response.labels.iter().map(ToString::to_string).collect(),
        timestamp: response.timestamp,
    })))
}

/// 下载压缩包
///
/// 指定 label 时返回该演绎的压缩包，否则返回合并包
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ArchiveRequest>,
) -> Result<Response, ApiError> {
    let label = req
        .label
        .as_deref()
        .map(RenditionLabel::parse)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.session_manager.touch(&req.session_id);

    let archive = state.get_archive_handler.handle(GetArchive {
        session_id: req.session_id,
        label,
    })?;

    tracing::info!(
        file_name = %archive.file_name,
        size = archive.data.len(),
        "Archive served"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, archive.content_type)
        .header(header::CONTENT_LENGTH, archive.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive.file_name),
        )
        .body(Body::from(archive.data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 关闭会话
pub async fn close_generation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let response = state
        .close_generation_handler
        .handle(CloseGenerationCommand {
            session_id: req.session_id,
        })?;

    state
        .event_publisher
        .publish_session_closed(&response.session_id, "closed");
    state.event_publisher.unregister_session(&response.session_id);

    Ok(Json(ApiResponse::ok()))
}
