// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use thiserror::Error;

/// 页面驱动错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 导航结果
///
/// `content` 是导航完成后的文档快照，抽取只在这份快照上进行，
/// 不会有任何页面内的节点句柄越过驱动边界
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// 最终地址（跟随重定向之后）
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 是否由缓存提供
    pub from_cache: bool,
    /// 文档快照
    pub content: String,
}

impl PageResponse {
    pub fn new(url: impl Into<String>, status_code: u16, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code,
            from_cache: false,
            content: content.into(),
        }
    }

    /// 标记为缓存命中
    pub fn cached(mut self) -> Self {
        self.from_cache = true;
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }
}

/// 页面驱动特质
///
/// 每个抓取器实例只持有一个驱动，所有导航按顺序发起
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定地址并返回文档快照
    async fn goto(&self, url: &str) -> Result<PageResponse, EngineError>;

    /// 驱动名称
    fn name(&self) -> &'static str;
}
