// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use scraper::Selector;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::models::record::{PendingUrl, Record};
use crate::domain::models::site_profile::SiteProfile;
use crate::domain::repositories::blob_repository::{BlobRepository, FRAGMENT_DIR};
use crate::domain::repositories::record_repository::RecordRepository;
use crate::domain::services::aggregation_service::{
    AggregationReport, AggregationService, AggregationSpec,
};
use crate::domain::services::extraction_service::ExtractionService;
use crate::domain::services::throttled_fetcher::ThrottledFetcher;
use crate::utils::errors::{RepositoryError, ScraperError};

/// 待抓取地址所在集合
pub const PENDING_URL_COLLECTION: &str = "_url";

/// 单次抓取的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// 抽取并保存成功
    Success(Record),
    /// 页面被跳过，不是错误
    Skipped(SkipReason),
}

impl ScrapeOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            ScrapeOutcome::Success(record) => Some(record),
            ScrapeOutcome::Skipped(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            ScrapeOutcome::Success(record) => Some(record),
            ScrapeOutcome::Skipped(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success(_))
    }
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 地址已在黑名单中
    Blacklisted { url: String },
    /// 页面无效，已加入黑名单
    InvalidPage { url: String, status_code: u16 },
    /// 整理后的记录没有 id，未保存
    MissingId,
}

/// 站点抓取器
///
/// 每个站点一个实例，持有唯一的页面驱动（经由限流抓取器）以及
/// 该站点命名空间下的记录库和文本块存储
pub struct SiteScraper {
    profile: Arc<SiteProfile>,
    fetcher: ThrottledFetcher,
    records: Arc<dyn RecordRepository>,
    blobs: Arc<dyn BlobRepository>,
}

impl SiteScraper {
    pub fn new(
        profile: Arc<SiteProfile>,
        fetcher: ThrottledFetcher,
        records: Arc<dyn RecordRepository>,
        blobs: Arc<dyn BlobRepository>,
    ) -> Self {
        Self {
            profile,
            fetcher,
            records,
            blobs,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn blob_store(&self) -> &Arc<dyn BlobRepository> {
        &self.blobs
    }

    /// 抓取一个实体
    ///
    /// # 参数
    ///
    /// * `entity_type` - 实体类型，如 "book"、"fragment"
    /// * `params` - 传给地址构造和 `post_parse` 的参数
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeOutcome::Success)` - 记录已按 `(entity_type, id)` 整体写入
    /// * `Ok(ScrapeOutcome::Skipped)` - 页面在黑名单中、页面无效或记录缺少 id
    /// * `Err(ScraperError)` - 未知实体、驱动错误或存储错误
    pub async fn scrape(&self, entity_type: &str, params: &[Value]) -> Result<ScrapeOutcome, ScraperError> {
        let entity = self
            .profile
            .entity(entity_type)
            .ok_or_else(|| ScraperError::UnknownEntity(entity_type.to_string()))?;

        let url = entity.build_url(&self.profile.base_url, params)?;
        debug!("scrape {} <- {}", entity_type, url);

        let page = match self.fetcher.goto(&url).await? {
            Some(page) if entity.is_valid_page(&page) => page,
            Some(page) => {
                self.fetcher.blacklist().blacklist_url(&url).await?;
                counter!("stashrs_scrape_skipped_total", "reason" => "invalid_page").increment(1);
                warn!("invalid page ({}): {}", page.status_code, url);
                return Ok(ScrapeOutcome::Skipped(SkipReason::InvalidPage {
                    url,
                    status_code: page.status_code,
                }));
            }
            None => {
                counter!("stashrs_scrape_skipped_total", "reason" => "blacklisted").increment(1);
                return Ok(ScrapeOutcome::Skipped(SkipReason::Blacklisted { url }));
            }
        };

        let page_url = if page.url.is_empty() { url.as_str() } else { page.url.as_str() };
        let mut record = ExtractionService::extract(&page.content, page_url, entity.parse_rules());

        entity.post_parse(self, &mut record, params).await?;

        let Some(id) = record.id() else {
            counter!("stashrs_scrape_skipped_total", "reason" => "missing_id").increment(1);
            warn!("{} record from {} has no id, not saved", entity_type, url);
            return Ok(ScrapeOutcome::Skipped(SkipReason::MissingId));
        };

        self.records
            .upsert(entity_type, &id, &record.clone().into_value())
            .await?;
        counter!("stashrs_records_upserted_total", "entity" => entity_type.to_string()).increment(1);

        Ok(ScrapeOutcome::Success(record))
    }

    /// 执行站点命令
    pub async fn run(&self, command: &str, params: &[Value]) -> Result<(), ScraperError> {
        let handler = self
            .profile
            .run(command)
            .ok_or_else(|| ScraperError::UnknownCommand(command.to_string()))?;

        info!("[{}] run {} {:?}", self.profile.site_id, command, params);
        handler.execute(self, params).await
    }

    /// 抓取页面并返回匹配节点的属性列表，页面被跳过时返回空列表
    pub async fn select_els_on_url(
        &self,
        url: &str,
        selector: &str,
        attrs: &[&str],
    ) -> Result<Vec<Map<String, Value>>, ScraperError> {
        let selector = Selector::parse(selector)
            .map_err(|e| ScraperError::InvalidParams(format!("无效的选择器 {}: {}", selector, e)))?;

        let Some(page) = self.fetcher.goto(url).await? else {
            return Ok(Vec::new());
        };

        let page_url = if page.url.is_empty() { url } else { page.url.as_str() };
        Ok(ExtractionService::select_attributes(&page.content, page_url, &selector, attrs))
    }

    /// 记录待抓取的条目地址，已存在的地址保持不变
    ///
    /// 返回新加入的数量
    pub async fn add_item_urls_to_scrape(&self, urls: &[String]) -> Result<usize, ScraperError> {
        let mut added = 0;
        for url in urls {
            if self.records.find_one(PENDING_URL_COLLECTION, url).await?.is_some() {
                continue;
            }
            let pending = serde_json::to_value(PendingUrl::new_item(url.as_str()))
                .map_err(RepositoryError::from)?;
            self.records.upsert(PENDING_URL_COLLECTION, url, &pending).await?;
            added += 1;
        }
        Ok(added)
    }

    /// 直接读取已保存的记录
    pub async fn find_record(&self, entity_type: &str, id: &str) -> Result<Option<Record>, ScraperError> {
        Ok(self
            .records
            .find_one(entity_type, id)
            .await?
            .and_then(Record::from_value))
    }

    /// 保存片段正文到 `itemId/_fragment/fragmentId`
    pub async fn save_fragment_content(
        &self,
        item_id: &str,
        fragment_id: &str,
        text: &str,
    ) -> Result<(), ScraperError> {
        let dir = format!("{}/{}", item_id, FRAGMENT_DIR);
        self.blobs.write(&dir, fragment_id, text).await?;
        Ok(())
    }

    /// 聚合条目的片段
    pub async fn aggregate_fragments(
        &self,
        item_id: &str,
        spec: AggregationSpec,
    ) -> Result<AggregationReport, ScraperError> {
        Ok(self.aggregation().aggregate(item_id, spec).await?)
    }

    /// 目录级辅助操作（分组、拼接文件）
    pub fn aggregation(&self) -> AggregationService {
        AggregationService::new(self.blobs.clone())
    }

    pub fn log(&self, message: &str) {
        info!("[{}] {}", self.profile.site_id, message);
    }
}

#[cfg(test)]
#[path = "site_scraper_test.rs"]
mod tests;
