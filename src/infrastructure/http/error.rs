//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const CONFIGURATION: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// 配置错误：在处理任何片段之前中止
    Configuration(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (i32, &str) {
        match self {
            ApiError::NotFound(msg) => (errno::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (errno::BAD_REQUEST, msg),
            ApiError::Configuration(msg) => (errno::CONFIGURATION, msg),
            ApiError::Conflict(msg) => (errno::CONFLICT, msg),
            ApiError::Internal(msg) => (errno::INTERNAL_ERROR, msg),
        }
    }
}

/// 附加在错误响应上的业务错误信息，由日志中间件读取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorInfo {
    pub errno: i32,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, msg) = self.parts();
        let info = ApiErrorInfo {
            errno: code,
            message: msg.to_string(),
        };

        // 业务错误统一以 200 返回，由 errno 区分
        let mut response = (StatusCode::OK, Json(ErrorResponse::new(code, msg))).into_response();
        response.extensions_mut().insert(info);
        response
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Configuration(msg) => ApiError::Configuration(msg),
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::InvalidState(msg) => ApiError::Conflict(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}
