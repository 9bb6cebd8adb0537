// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::record::BlacklistRecord;
use crate::domain::repositories::record_repository::RecordRepository;
use crate::utils::errors::RepositoryError;

/// 黑名单所在集合，位于共享命名空间
pub const BLACKLIST_COLLECTION: &str = "blacklistUrl";

/// 永久黑名单
///
/// 地址一旦加入就不会再被抓取，也不会过期。多进程同时写入同一命名空间不安全
#[derive(Clone)]
pub struct BlacklistTracker {
    store: Arc<dyn RecordRepository>,
}

impl BlacklistTracker {
    pub fn new(store: Arc<dyn RecordRepository>) -> Self {
        Self { store }
    }

    /// 加入黑名单，已存在时不做任何事
    pub async fn blacklist_url(&self, url: &str) -> Result<(), RepositoryError> {
        if self.is_blacklisted(url).await? {
            return Ok(());
        }

        let record = serde_json::to_value(BlacklistRecord::new(url))?;
        self.store.upsert(BLACKLIST_COLLECTION, url, &record).await?;
        counter!("stashrs_blacklisted_urls_total").increment(1);
        info!("blacklisted: {}", url);
        Ok(())
    }

    pub async fn is_blacklisted(&self, url: &str) -> Result<bool, RepositoryError> {
        Ok(self.store.find_one(BLACKLIST_COLLECTION, url).await?.is_some())
    }
}
