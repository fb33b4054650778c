//! HTTP 测试夹具：完整的应用状态（含后台 worker），音色列表只包含 voice-1

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::util::ServiceExt;

use super::routes::create_routes;
use super::state::AppState;
use crate::config::GenerationConfig;
use crate::infrastructure::adapters::{
    FakeSynthesisClient, FakeSynthesisClientConfig, ZipArchivePackager,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::InMemorySessionManager;
use crate::infrastructure::worker::{GenerationWorker, GenerationWorkerConfig};

pub(crate) struct TestApp {
    pub router: Router,
    pub client: Arc<FakeSynthesisClient>,
}

/// 需要在 tokio 运行时内调用（worker 会被 spawn）
pub(crate) fn test_state() -> (AppState, Arc<FakeSynthesisClient>) {
    let mut voices = BTreeMap::new();
    voices.insert("Rachel".to_string(), "voice-1".to_string());
    let client = Arc::new(FakeSynthesisClient::new(FakeSynthesisClientConfig {
        voices,
        ..Default::default()
    }));
    let sessions = Arc::new(InMemorySessionManager::new());
    let packager = Arc::new(ZipArchivePackager::new());
    let publisher = EventPublisher::new().arc();
    let (tx, rx) = mpsc::channel(8);

    let worker = GenerationWorker::new(
        GenerationWorkerConfig::default(),
        rx,
        sessions.clone(),
        client.clone(),
        packager.clone(),
        publisher.clone(),
    );
    tokio::spawn(worker.run());

    let state = AppState::new(
        sessions,
        client.clone(),
        packager,
        publisher,
        tx,
        GenerationConfig::default(),
    );
    (state, client)
}

pub(crate) fn test_app() -> TestApp {
    let (state, client) = test_state();
    TestApp {
        router: create_routes().with_state(Arc::new(state)),
        client,
    }
}

pub(crate) fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(json_request(uri, &body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
