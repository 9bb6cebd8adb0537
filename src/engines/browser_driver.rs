// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DriverSettings;
use crate::engines::traits::{EngineError, PageDriver, PageResponse};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;

// Navigation Timing exposes the response status and whether the body came
// from the HTTP cache (transferSize == 0 with a non-empty decoded body).
const NAVIGATION_PROBE: &str = r#"(() => {
    const nav = performance.getEntriesByType('navigation')[0];
    return {
        url: location.href,
        status: nav && nav.responseStatus ? nav.responseStatus : 200,
        fromCache: !!nav && nav.transferSize === 0 && nav.decodedBodySize > 0
    };
})()"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NavigationProbe {
    url: String,
    status: u16,
    from_cache: bool,
}

/// 浏览器页面驱动
///
/// 基于chromiumoxide实现，启动本地无头 Chrome 或连接远程调试端口，
/// 整个生命周期内只使用一个标签页
pub struct BrowserDriver {
    // Keeps the CDP connection alive for as long as the page is used.
    _browser: Browser,
    page: Page,
    timeout: Duration,
}

impl BrowserDriver {
    /// 启动或连接浏览器并打开一个空白页
    ///
    /// # 参数
    ///
    /// * `settings` - 页面驱动配置
    ///
    /// # 返回值
    ///
    /// * `Ok(BrowserDriver)` - 可用的驱动
    /// * `Err(EngineError)` - 浏览器启动或连接失败
    pub async fn launch(settings: &DriverSettings) -> Result<Self, EngineError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        let (browser, mut handler) = if let Some(ref url) = settings.remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url)
                .await
                .map_err(|e| EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(timeout)
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--ignore-certificate-errors");

            // 复用用户数据目录可以让 Chrome 的磁盘缓存跨进程生效
            if let Some(ref dir) = settings.user_data_dir {
                builder = builder.user_data_dir(dir);
            }

            Browser::launch(builder.build().map_err(EngineError::Browser)?)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
        };

        // Spawn a handler to process browser events
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;

        if let Some(ref user_agent) = settings.user_agent {
            page.set_user_agent(user_agent.as_str())
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;
        }

        Ok(Self {
            _browser: browser,
            page,
            timeout,
        })
    }
}

#[async_trait]
impl PageDriver for BrowserDriver {
    /// 导航并读取渲染后的文档
    ///
    /// 整个导航过程受 `request_timeout_secs` 约束，超时返回 `EngineError::Timeout`
    async fn goto(&self, url: &str) -> Result<PageResponse, EngineError> {
        tokio::time::timeout(self.timeout, async {
            // goto waits for the load event by default
            self.page
                .goto(url)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            let probe: NavigationProbe = self
                .page
                .evaluate(NAVIGATION_PROBE)
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?
                .into_value()
                .map_err(|e| EngineError::Other(format!("Invalid navigation probe: {}", e)))?;

            let content = self
                .page
                .content()
                .await
                .map_err(|e| EngineError::Browser(e.to_string()))?;

            Ok(PageResponse {
                url: probe.url,
                status_code: probe.status,
                from_cache: probe.from_cache,
                content,
            })
        })
        .await
        .map_err(|_| EngineError::Timeout)?
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
