//! HTTP Middleware
//!
//! 请求失败日志：业务错误以 200 返回，只能通过 errno 识别

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use super::error::ApiErrorInfo;

/// 响应头：非 0 的 errno，便于代理和客户端在不解析 body 的情况下识别失败
pub const ERRNO_HEADER: HeaderName = HeaderName::from_static("x-voxbatch-errno");

/// 请求失败日志中间件
///
/// - 业务错误（ApiErrorInfo）：errno >= 500 记 error，其余记 warn，并写入 `x-voxbatch-errno`
/// - 未经 ApiError 的 4xx/5xx（提取器拒绝、路由不存在）按状态码记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if let Some(info) = response.extensions().get::<ApiErrorInfo>().cloned() {
        response
            .headers_mut()
            .insert(ERRNO_HEADER, HeaderValue::from(info.errno));

        if info.errno >= 500 {
            tracing::error!(
                method = %method,
                uri = %uri,
                errno = info.errno,
                error = %info.message,
                elapsed_ms = elapsed_ms,
                "Request failed"
            );
        } else {
            tracing::warn!(
                method = %method,
                uri = %uri,
                errno = info.errno,
                error = %info.message,
                elapsed_ms = elapsed_ms,
                "Request rejected"
            );
        }
    } else if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    }

    response
}
