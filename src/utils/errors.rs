// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::blob_repository::StorageError;
use crate::engines::traits::EngineError;

/// 记录仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效参数: {0}")]
    InvalidParameter(String),
}

/// 站点抓取错误类型
///
/// 只有未知实体与未知命令属于调用方错误；页面级失败不会出现在这里，
/// 它们被转换为黑名单记录和 `ScrapeOutcome::Skipped`
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("{0} is not a valid entity")]
    UnknownEntity(String),

    #[error("{0} is not a valid command")]
    UnknownCommand(String),

    #[error("页面驱动错误: {0}")]
    Transport(#[from] EngineError),

    #[error("仓库错误: {0}")]
    Repository(#[from] RepositoryError),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("无效参数: {0}")]
    InvalidParams(String),

    #[error("站点配置错误: {0}")]
    Profile(String),
}
