//! Zip Packager - 把演绎打包为 zip
//!
//! 每个标签一个压缩包，条目名为 `{position}.mp3`；
//! 合并包包含全部演绎，条目名为 `{position}{label}.mp3`

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::application::ports::{ArchivePackagerPort, PackageError};
use crate::domain::generation::{ArchiveGroup, Rendition, RenditionLabel};

const AUDIO_EXTENSION: &str = "mp3";

/// Zip 打包器（无状态）
#[derive(Debug, Clone, Default)]
pub struct ZipArchivePackager;

impl ZipArchivePackager {
    pub fn new() -> Self {
        Self
    }

    fn write_archive<'a>(
        entries: impl IntoIterator<Item = (String, &'a [u8])>,
    ) -> Result<Vec<u8>, PackageError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data) in entries {
            writer
                .start_file(name, options)
                .map_err(|e| PackageError::Archive(e.to_string()))?;
            writer
                .write_all(data)
                .map_err(|e| PackageError::Io(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| PackageError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl ArchivePackagerPort for ZipArchivePackager {
    fn package_by_rendition(&self, renditions: &[Rendition]) -> Result<ArchiveGroup, PackageError> {
        let mut grouped: BTreeMap<RenditionLabel, Vec<&Rendition>> = BTreeMap::new();
        for rendition in renditions {
            grouped.entry(rendition.label).or_default().push(rendition);
        }

        let mut archives = BTreeMap::new();
        for (label, mut members) in grouped {
            members.sort_by_key(|r| r.position);
            let data = Self::write_archive(members.into_iter().map(|r| {
                (
                    format!("{}.{}", r.position, AUDIO_EXTENSION),
                    r.audio.as_slice(),
                )
            }))?;
            tracing::debug!(label = %label, size = data.len(), "Archive packaged");
            archives.insert(label, data);
        }

        Ok(ArchiveGroup::new(archives))
    }

    fn package_combined(&self, renditions: &[Rendition]) -> Result<Vec<u8>, PackageError> {
        let mut sorted: Vec<&Rendition> = renditions.iter().collect();
        sorted.sort_by_key(|r| r.key());

        Self::write_archive(sorted.into_iter().map(|r| {
            (
                format!("{}{}.{}", r.position, r.label, AUDIO_EXTENSION),
                r.audio.as_slice(),
            )
        }))
    }
}
