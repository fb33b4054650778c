//! Archive Adapter - zip 打包

mod zip_packager;

pub use zip_packager::ZipArchivePackager;
