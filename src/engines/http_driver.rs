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

use crate::config::settings::DriverSettings;
use crate::engines::traits::{EngineError, PageDriver, PageResponse};
use crate::utils::text_encoding::decode_html;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// HTTP 页面驱动
///
/// 基于reqwest实现，不执行脚本。成功的响应会进入进程内 LRU 缓存，
/// 再次访问同一地址时返回 `from_cache = true` 的快照
pub struct HttpDriver {
    client: reqwest::Client,
    cache: Mutex<LruCache<String, PageResponse>>,
}

impl HttpDriver {
    /// 创建 HTTP 驱动
    ///
    /// # 参数
    ///
    /// * `settings` - 页面驱动配置
    pub fn new(settings: &DriverSettings) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .cookie_store(true)
            .build()?;

        let capacity = NonZeroUsize::new(settings.cache_capacity).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            client,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    /// 执行HTTP抓取
    ///
    /// 非 2xx 响应同样返回 `Ok`，由调用方根据状态码判断页面是否有效
    async fn goto(&self, url: &str) -> Result<PageResponse, EngineError> {
        if let Some(hit) = self.cache.lock().get(url).cloned() {
            tracing::debug!("cache hit: {}", url);
            return Ok(hit.cached());
        }

        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?;
        let content = decode_html(&body, content_type.as_deref());

        let page = PageResponse::new(final_url, status_code, content);
        if (200..300).contains(&status_code) {
            self.cache.lock().put(url.to_string(), page.clone());
        }

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
#[path = "http_driver_test.rs"]
mod tests;
