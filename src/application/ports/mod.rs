//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod archive_packager;
mod pacer;
mod progress;
mod rendition_store;
mod session_manager;
mod synthesis;

pub use archive_packager::{ArchivePackagerPort, PackageError};
pub use pacer::PacerPort;
pub use progress::{ProgressEvent, ProgressSinkPort};
pub use rendition_store::{RenditionStorePort, StoreProgress};
pub use session_manager::{GenerationSession, SessionError, SessionManagerPort, SessionState};
pub use synthesis::{SynthesisError, SynthesisPort, SynthesisRequest};
