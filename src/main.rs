//! Voxbatch - 批量语音合成服务
//!
//! - Domain: fragmenter, generation/
//! - Application: commands, queries, ports, generation
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use voxbatch::config::{load_config, print_config};
use voxbatch::infrastructure::adapters::{
    HttpSynthesisClient, HttpSynthesisClientConfig, ZipArchivePackager,
};
use voxbatch::infrastructure::events::EventPublisher;
use voxbatch::infrastructure::http::{AppState, HttpServer};
use voxbatch::infrastructure::memory::InMemorySessionManager;
use voxbatch::infrastructure::worker::{
    GenerationWorker, GenerationWorkerConfig, SessionReaper, SessionReaperConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},voxbatch={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Voxbatch - 批量语音合成服务");
    print_config(&config);

    // 创建合成客户端
    let synthesis_config = HttpSynthesisClientConfig::new(&config.provider.base_url)
        .with_timeout(config.provider.timeout_secs);
    let synthesis = Arc::new(HttpSynthesisClient::new(synthesis_config)?);

    let packager = Arc::new(ZipArchivePackager::new());
    let event_publisher = EventPublisher::new().arc();
    let session_manager = Arc::new(InMemorySessionManager::new());

    // 创建任务队列
    let (job_tx, job_rx) = mpsc::channel(config.worker.queue_capacity.max(1));

    // 启动 GenerationWorker
    let worker = GenerationWorker::new(
        GenerationWorkerConfig {
            max_concurrent: config.worker.max_concurrent,
        },
        job_rx,
        session_manager.clone(),
        synthesis.clone(),
        packager.clone(),
        event_publisher.clone(),
    );
    tokio::spawn(worker.run());

    // 启动会话回收
    if config.gc.enabled {
        let reaper = SessionReaper::new(
            SessionReaperConfig {
                interval: Duration::from_secs(config.gc.interval_secs),
                session_expire_secs: config.gc.session_expire_secs,
            },
            session_manager.clone(),
            event_publisher.clone(),
        );
        tokio::spawn(reaper.run());
    }

    // 创建 HTTP 服务器
    let state = AppState::new(
        session_manager,
        synthesis,
        packager,
        event_publisher,
        job_tx,
        config.generation.clone(),
    );
    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
