//! Archive Packager Port - 音频打包
//!
//! 按演绎标签分组打包，或把全部演绎打成一个包；实现不保留任何状态

use thiserror::Error;

use crate::domain::generation::{ArchiveGroup, Rendition};

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub trait ArchivePackagerPort: Send + Sync {
    /// 每个标签一个压缩包，条目名为 `{position}.{ext}`
    fn package_by_rendition(&self, renditions: &[Rendition]) -> Result<ArchiveGroup, PackageError>;

    /// 单个压缩包，条目名为 `{position}{label}.{ext}`
    fn package_combined(&self, renditions: &[Rendition]) -> Result<Vec<u8>, PackageError>;
}
