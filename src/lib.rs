//! Voxbatch - 批量语音合成工具
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Fragmenter: 将长文本切分为不超过上限的片段
//! - Generation Context: 演绎、批次与压缩包分组
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Synthesis, RenditionStore, Pacer, ArchivePackager, SessionManager）
//! - Generation: 演绎引擎与生成编排
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Adapters: 合成客户端、节流器、zip 打包
//! - Memory: RenditionStore, SessionManager 内存实现
//! - Worker: GenerationWorker 后台任务处理, SessionReaper 会话回收
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
