// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Local;
use metrics::counter;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::settings::ThrottleSettings;
use crate::domain::services::blacklist::BlacklistTracker;
use crate::engines::traits::{PageDriver, PageResponse};
use crate::utils::errors::ScraperError;

/// 限流参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// 两次真实抓取之间的最小间隔
    pub min_interval: Duration,
    /// 间隔不足时固定等待的时长
    pub delay: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(5),
            delay: Duration::from_secs(8),
        }
    }
}

impl From<&ThrottleSettings> for ThrottleConfig {
    fn from(settings: &ThrottleSettings) -> Self {
        Self {
            min_interval: Duration::from_millis(settings.min_interval_ms),
            delay: Duration::from_millis(settings.delay_ms),
        }
    }
}

/// 限流抓取器
///
/// 单槽漏桶：上一次非缓存抓取距今不足 `min_interval` 时固定等待 `delay`，
/// 不维护请求队列。缓存命中不会重置计时
pub struct ThrottledFetcher {
    driver: Arc<dyn PageDriver>,
    blacklist: BlacklistTracker,
    config: ThrottleConfig,
    last_fetch: Mutex<Option<Instant>>,
}

impl ThrottledFetcher {
    pub fn new(driver: Arc<dyn PageDriver>, blacklist: BlacklistTracker, config: ThrottleConfig) -> Self {
        Self {
            driver,
            blacklist,
            config,
            last_fetch: Mutex::new(None),
        }
    }

    pub fn blacklist(&self) -> &BlacklistTracker {
        &self.blacklist
    }

    /// 抓取页面
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(page))` - 抓取成功（页面是否有效由调用方判断）
    /// * `Ok(None)` - 地址在黑名单中，未访问驱动
    /// * `Err(ScraperError)` - 驱动错误原样向上传递，不重试
    pub async fn goto(&self, url: &str) -> Result<Option<PageResponse>, ScraperError> {
        if self.blacklist.is_blacklisted(url).await? {
            counter!("stashrs_fetch_blacklisted_total").increment(1);
            debug!("skip blacklisted url: {}", url);
            return Ok(None);
        }

        let must_wait = self
            .last_fetch
            .lock()
            .is_some_and(|last| last.elapsed() < self.config.min_interval);
        if must_wait {
            counter!("stashrs_throttle_waits_total").increment(1);
            tokio::time::sleep(self.config.delay).await;
        }

        let page = self.driver.goto(url).await?;
        counter!("stashrs_fetch_total", "driver" => self.driver.name()).increment(1);

        if page.from_cache {
            counter!("stashrs_fetch_cache_hits_total").increment(1);
        } else {
            *self.last_fetch.lock() = Some(Instant::now());
            info!("{}: {}", Local::now().format("%Y-%m-%d %H:%M:%S"), url);
        }

        Ok(Some(page))
    }
}

#[cfg(test)]
#[path = "throttled_fetcher_test.rs"]
mod tests;
