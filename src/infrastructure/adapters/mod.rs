//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod archive;
pub mod pacing;
pub mod synthesis;

pub use archive::*;
pub use pacing::*;
pub use synthesis::*;
