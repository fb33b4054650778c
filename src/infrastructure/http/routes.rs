//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                   GET   健康检查
//! - /api/voices/list            POST  列出 API key 可用的音色
//! - /api/generation/start       POST  提交生成任务（进度通过 WS 推送）
//! - /api/generation/status      POST  查询生成进度
//! - /api/generation/recover     POST  从缓存恢复上一次生成
//! - /api/generation/archive     POST  下载压缩包（单个演绎或合并包）
//! - /api/generation/close       POST  关闭会话
//! - /ws/generation/{id}         WS    Session WebSocket（进度事件）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/generation/:session_id", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/voices/list", post(handlers::list_voices))
        .nest("/generation", generation_routes())
}

/// Generation 路由
fn generation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_generation))
        .route("/status", post(handlers::generation_status))
        .route("/recover", post(handlers::recover_generation))
        .route("/archive", post(handlers::download_archive))
        .route("/close", post(handlers::close_generation))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_request, post_json, test_app};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn start_body(text: &str, voice_id: &str) -> Value {
        json!({
            "text": text,
            "api_key": "key",
            "voice_id": voice_id,
            "rendition_count": 2,
            "pacing_delay_ms": 500,
        })
    }

    async fn wait_for_state(router: &Router, session_id: &str, state: &str) -> Value {
        for _ in 0..1000 {
            let (_, json) = post_json(
                router,
                "/api/generation/status",
                json!({ "session_id": session_id }),
            )
            .await;
            if json["data"]["state"] == state {
                return json;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session {} never reached state {}", session_id, state);
    }

    #[tokio::test]
    async fn test_ping() {
        let app = test_app();
        let request = Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_voices() {
        let app = test_app();
        let (status, json) =
            post_json(&app.router, "/api/voices/list", json!({ "api_key": "key" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"][0]["name"], "Rachel");
        assert_eq!(json["data"][0]["voice_id"], "voice-1");
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_voice() {
        let app = test_app();
        let (status, json) = post_json(
            &app.router,
            "/api/generation/start",
            start_body("Hello there.", "voice-x"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errno"], 422);
        assert_eq!(app.client.calls(), 0);
    }

    #[tokio::test]
    async fn test_start_rejects_empty_text() {
        let app = test_app();
        let (_, json) = post_json(
            &app.router,
            "/api/generation/start",
            start_body("   ", "voice-1"),
        )
        .await;
        assert_eq!(json["errno"], 422);
    }

    #[tokio::test]
    async fn test_start_rejects_out_of_range_pacing() {
        let app = test_app();
        for delay in [0u64, 10_501, u64::MAX] {
            let mut body = start_body("Hello there.", "voice-1");
            body["pacing_delay_ms"] = json!(delay);
            let (_, json) = post_json(&app.router, "/api/generation/start", body).await;
            assert_eq!(json["errno"], 422, "pacing {} should be rejected", delay);
        }
        assert_eq!(app.client.calls(), 0);
    }

    #[tokio::test]
    async fn test_status_unknown_session() {
        let app = test_app();
        let (_, json) = post_json(
            &app.router,
            "/api/generation/status",
            json!({ "session_id": "missing" }),
        )
        .await;
        assert_eq!(json["errno"], 404);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_end_to_end() {
        let app = test_app();
        let (_, json) = post_json(
            &app.router,
            "/api/generation/start",
            start_body("First sentence. Second one.", "voice-1"),
        )
        .await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["total_fragments"], 1);
        assert_eq!(json["data"]["total_units"], 2);
        assert_eq!(json["data"]["mode"], "fresh");
        let session_id = json["data"]["session_id"].as_str().unwrap().to_string();

        let status = wait_for_state(&app.router, &session_id, "completed").await;
        assert_eq!(status["data"]["completed_units"], 2);
        assert_eq!(status["data"]["run"]["labels"], json!(["a", "b"]));
        assert_eq!(app.client.calls(), 2);

        // 单个演绎的压缩包
        let request = json_request(
            "/api/generation/archive",
            &json!({ "session_id": session_id, "label": "b" }),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/zip"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("audios_version_b_"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));

        // 非法标签
        let (_, json) = post_json(
            &app.router,
            "/api/generation/archive",
            json!({ "session_id": session_id, "label": "!" }),
        )
        .await;
        assert_eq!(json["errno"], 400);

        // 关闭后会话不可用
        let (_, json) = post_json(
            &app.router,
            "/api/generation/close",
            json!({ "session_id": session_id }),
        )
        .await;
        assert_eq!(json["errno"], 0);
        let (_, json) = post_json(
            &app.router,
            "/api/generation/status",
            json!({ "session_id": session_id }),
        )
        .await;
        assert_eq!(json["errno"], 404);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recover_returns_completed_run() {
        let app = test_app();
        let (_, json) = post_json(
            &app.router,
            "/api/generation/start",
            start_body("Only sentence.", "voice-1"),
        )
        .await;
        let session_id = json["data"]["session_id"].as_str().unwrap().to_string();
        wait_for_state(&app.router, &session_id, "completed").await;

        let (_, json) = post_json(
            &app.router,
            "/api/generation/recover",
            json!({ "session_id": session_id }),
        )
        .await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["complete_fragments"], 1);
        assert_eq!(json["data"]["renditions"], 2);
    }
}
