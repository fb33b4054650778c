//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Synthesis、RenditionStore、Pacer、Packager、SessionManager 等）
//! - generation: 演绎引擎与生成编排
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod generation;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    CloseGenerationCommand,
    CloseGenerationResponse,
    GenerationJob,
    RecoverGenerationCommand,
    RecoverGenerationResponse,
    StartGenerationCommand,
    StartGenerationResponse,
    // Handlers
    handlers::{CloseGenerationHandler, RecoverGenerationHandler, StartGenerationHandler},
};

pub use error::ApplicationError;

pub use generation::{recover_run, GenerationOrchestrator, RenditionEngine, RunMode};

pub use ports::{
    ArchivePackagerPort,
    GenerationSession,
    PackageError,
    PacerPort,
    ProgressEvent,
    ProgressSinkPort,
    RenditionStorePort,
    SessionError,
    SessionManagerPort,
    SessionState,
    StoreProgress,
    SynthesisError,
    SynthesisPort,
    SynthesisRequest,
};

pub use queries::{
    GetArchive,
    GetArchiveResponse,
    GetGenerationStatus,
    ListVoices,
    // Handlers
    handlers::{
        GenerationStatusResponse, GetArchiveHandler, GetGenerationStatusHandler,
        ListVoicesHandler, RunSummary, VoiceResponse,
    },
};
