// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stashrs::domain::models::site_profile::SiteProfile;
use stashrs::domain::repositories::blob_repository::BlobRepository;
use stashrs::domain::repositories::record_repository::RecordRepository;
use stashrs::domain::services::blacklist::BlacklistTracker;
use stashrs::domain::services::site_scraper::SiteScraper;
use stashrs::domain::services::throttled_fetcher::{ThrottleConfig, ThrottledFetcher};
use stashrs::engines::traits::{EngineError, PageDriver, PageResponse};
use stashrs::infrastructure::database::memory_store::MemoryRecordStore;
use stashrs::infrastructure::storage::InMemoryBlobStore;
use stashrs::utils::errors::RepositoryError;

/// 静态页面驱动，未登记的地址返回 404
#[derive(Default)]
pub struct StubDriver {
    pages: HashMap<String, (u16, String)>,
    visited: Mutex<Vec<String>>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), (200, html.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), (status, String::new()));
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

#[async_trait]
impl PageDriver for StubDriver {
    async fn goto(&self, url: &str) -> Result<PageResponse, EngineError> {
        self.visited.lock().push(url.to_string());
        let (status, html) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, "<html><body>not found</body></html>".to_string()));
        Ok(PageResponse::new(url, status, html))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 统计写入次数的记录库
#[derive(Default)]
pub struct CountingRecordStore {
    inner: MemoryRecordStore,
    upserts: AtomicUsize,
}

impl CountingRecordStore {
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordRepository for CountingRecordStore {
    async fn upsert(&self, collection: &str, id: &str, data: &Value) -> Result<(), RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(collection, id, data).await
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Value>, RepositoryError> {
        self.inner.find_one(collection, id).await
    }

    async fn count(&self, collection: &str) -> Result<usize, RepositoryError> {
        self.inner.count(collection).await
    }
}

pub fn no_throttle() -> ThrottleConfig {
    ThrottleConfig {
        min_interval: Duration::ZERO,
        delay: Duration::ZERO,
    }
}

/// 组装好的抓取器及其依赖
pub struct TestSite {
    pub scraper: SiteScraper,
    pub driver: Arc<StubDriver>,
    pub records: Arc<CountingRecordStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub common: Arc<MemoryRecordStore>,
}

pub fn test_site(profile: SiteProfile, driver: StubDriver) -> TestSite {
    let driver = Arc::new(driver);
    let records = Arc::new(CountingRecordStore::default());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let common = Arc::new(MemoryRecordStore::new());

    let fetcher = ThrottledFetcher::new(driver.clone(), BlacklistTracker::new(common.clone()), no_throttle());
    let scraper = SiteScraper::new(Arc::new(profile), fetcher, records.clone(), blobs.clone());

    TestSite {
        scraper,
        driver,
        records,
        blobs,
        common,
    }
}

pub async fn read_blob(blobs: &InMemoryBlobStore, path: &str) -> Option<String> {
    blobs.read(path).await.unwrap()
}
