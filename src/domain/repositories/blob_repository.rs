// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 存储错误
    #[error("Storage error: {0}")]
    Other(String),
}

/// 文本块存储仓库特质
///
/// 所有路径都相对于站点根目录，使用 `/` 分隔
#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// 列出目录下的文件名，忽略以 `_` 开头的名称；目录不存在时返回空列表
    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    /// 读取文本内容，不存在时返回 `None`
    async fn read(&self, path: &str) -> Result<Option<String>, StorageError>;

    /// 写入文本内容，按需创建目录，已存在则覆盖
    async fn write(&self, dir: &str, name: &str, content: &str) -> Result<(), StorageError>;
}

/// 片段正文的存放目录
pub const FRAGMENT_DIR: &str = "_fragment";

/// 片段正文路径 `itemId/_fragment/fragmentId`
pub fn fragment_path(item_id: &str, fragment_id: &str) -> String {
    format!("{}/{}/{}", item_id, FRAGMENT_DIR, fragment_id)
}
