// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::Value;

use crate::utils::errors::RepositoryError;

/// 记录仓库特质
///
/// 以集合名 + id 寻址的文档存储。`upsert` 整体替换旧记录，不做字段级合并
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// 插入或整体替换记录
    async fn upsert(&self, collection: &str, id: &str, data: &Value) -> Result<(), RepositoryError>;

    /// 按 id 查找记录
    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError>;

    /// 集合中的记录数量
    async fn count(&self, collection: &str) -> Result<usize, RepositoryError>;
}
