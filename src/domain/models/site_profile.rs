// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::models::parse_rule::ParseRules;
use crate::domain::models::record::Record;
use crate::domain::services::site_scraper::SiteScraper;
use crate::engines::traits::PageResponse;
use crate::utils::errors::ScraperError;

/// 实体定义
///
/// 每种可抓取的条目类型（如 "book"、"fragment"）各自实现地址构造、
/// 抽取规则和抽取后的整理逻辑
#[async_trait]
pub trait EntityDefinition: Send + Sync {
    /// 由站点根地址和调用参数构造目标地址
    fn build_url(&self, base_url: &str, params: &[Value]) -> Result<String, ScraperError>;

    /// 字段抽取规则
    fn parse_rules(&self) -> &ParseRules;

    /// 抽取完成后、写入记录库之前调用
    ///
    /// 可以设置 id、保存片段正文、删除临时字段或重排 `fragments`
    async fn post_parse(
        &self,
        _scraper: &SiteScraper,
        _record: &mut Record,
        _params: &[Value],
    ) -> Result<(), ScraperError> {
        Ok(())
    }

    /// 页面是否有效，无效页面会被永久拉黑
    fn is_valid_page(&self, _page: &PageResponse) -> bool {
        true
    }
}

/// 命名的多步骤流程，例如先抓取目录再逐个抓取片段
#[async_trait]
pub trait RunHandler: Send + Sync {
    async fn execute(&self, scraper: &SiteScraper, params: &[Value]) -> Result<(), ScraperError>;
}

/// 站点配置
pub struct SiteProfile {
    pub site_id: String,
    pub base_url: String,
    entities: HashMap<String, Arc<dyn EntityDefinition>>,
    runs: HashMap<String, Arc<dyn RunHandler>>,
}

impl SiteProfile {
    pub fn new(site_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            base_url: base_url.into(),
            entities: HashMap::new(),
            runs: HashMap::new(),
        }
    }

    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity: impl EntityDefinition + 'static,
    ) -> Self {
        self.entities.insert(entity_type.into(), Arc::new(entity));
        self
    }

    pub fn with_run(mut self, command: impl Into<String>, run: impl RunHandler + 'static) -> Self {
        self.runs.insert(command.into(), Arc::new(run));
        self
    }

    pub fn entity(&self, entity_type: &str) -> Option<Arc<dyn EntityDefinition>> {
        self.entities.get(entity_type).cloned()
    }

    pub fn run(&self, command: &str) -> Option<Arc<dyn RunHandler>> {
        self.runs.get(command).cloned()
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.runs.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for SiteProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entities: Vec<_> = self.entity_types().collect();
        entities.sort_unstable();
        let mut runs: Vec<_> = self.commands().collect();
        runs.sort_unstable();
        f.debug_struct("SiteProfile")
            .field("site_id", &self.site_id)
            .field("base_url", &self.base_url)
            .field("entities", &entities)
            .field("runs", &runs)
            .finish()
    }
}

/// 读取字符串参数
pub fn param_str<'a>(params: &'a [Value], index: usize, name: &str) -> Result<&'a str, ScraperError> {
    params
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| ScraperError::InvalidParams(format!("缺少参数 {} (位置 {})", name, index)))
}
