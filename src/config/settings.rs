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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含存储、限流、页面驱动和指标导出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 存储配置
    pub storage: StorageSettings,
    /// 抓取限流配置
    pub throttle: ThrottleSettings,
    /// 页面驱动配置
    pub driver: DriverSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// 片段与章节输出的根目录，每个站点一个子目录
    pub stash_path: String,
    /// 记录库根目录，每个命名空间一个子目录
    pub db_path: String,
}

/// 抓取限流配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleSettings {
    /// 两次真实抓取之间的最小间隔（毫秒）
    pub min_interval_ms: u64,
    /// 间隔不足时固定等待的时长（毫秒）
    pub delay_ms: u64,
}

/// 页面驱动配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DriverSettings {
    /// 驱动类型 (browser, http)
    pub kind: String,
    /// 远程 Chrome 调试地址 (当 kind=browser 时可选)
    pub remote_debugging_url: Option<String>,
    /// 浏览器用户数据目录，用于复用磁盘缓存
    pub user_data_dir: Option<String>,
    /// 自定义 User-Agent
    pub user_agent: Option<String>,
    /// 单次导航超时时间（秒）
    pub request_timeout_secs: u64,
    /// HTTP 驱动的响应缓存容量
    pub cache_capacity: usize,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `STASHRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("STASHRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅包含默认值的配置，不读取文件和环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Default Storage settings
            .set_default("storage.stash_path", "./stash")?
            .set_default("storage.db_path", "./db")?
            // Default Throttle settings
            .set_default("throttle.min_interval_ms", 5000)?
            .set_default("throttle.delay_ms", 8000)?
            // Default Driver settings
            .set_default("driver.kind", "browser")?
            .set_default("driver.request_timeout_secs", 60)?
            .set_default("driver.cache_capacity", 256)?
            // Default Metrics settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "127.0.0.1:9000")
    }
}
