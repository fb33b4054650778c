//! Generation Queries - 生成状态与产物

use crate::domain::generation::RenditionLabel;

/// 查询会话生成状态
#[derive(Debug, Clone)]
pub struct GetGenerationStatus {
    pub session_id: String,
}

/// 获取压缩包
///
/// `label` 为 None 时返回全部演绎的合并包
#[derive(Debug, Clone)]
pub struct GetArchive {
    pub session_id: String,
    pub label: Option<RenditionLabel>,
}

/// 压缩包响应
#[derive(Debug, Clone)]
pub struct GetArchiveResponse {
    pub file_name: String,
    pub data: Vec<u8>,
    pub content_type: String,
}
