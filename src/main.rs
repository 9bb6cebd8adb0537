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

use anyhow::{bail, Context};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use stashrs::config::settings::Settings;
use stashrs::domain::services::blacklist::BlacklistTracker;
use stashrs::domain::services::site_scraper::SiteScraper;
use stashrs::domain::services::throttled_fetcher::{ThrottleConfig, ThrottledFetcher};
use stashrs::engines::create_page_driver;
use stashrs::infrastructure::database::disk_store::DiskRecordStore;
use stashrs::infrastructure::storage::create_blob_repository;
use stashrs::sites;
use stashrs::utils::telemetry;

/// 黑名单所在的共享命名空间
const COMMON_NAMESPACE: &str = "common";

/// 主函数
///
/// 用法：`stashrs <siteId> <command> [args...]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();

    let mut args = std::env::args().skip(1);
    let (Some(site_id), Some(command)) = (args.next(), args.next()) else {
        bail!(
            "usage: stashrs <siteId> <command> [args...]\n  sites: {}",
            sites::site_ids().collect::<Vec<_>>().join(", ")
        );
    };
    let params: Vec<Value> = args.map(Value::String).collect();

    // 2. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    info!("Configuration loaded");

    stashrs::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Site profile
    let profile = Arc::new(sites::find(&site_id)?);

    // 4. Stores
    let records = Arc::new(DiskRecordStore::new(&settings.storage.db_path, &site_id));
    let common = Arc::new(DiskRecordStore::new(&settings.storage.db_path, COMMON_NAMESPACE));
    let blobs = create_blob_repository(&settings.storage, &site_id);

    // 5. Page driver
    let driver = create_page_driver(&settings.driver)
        .await
        .context("failed to start page driver")?;
    info!("Page driver ready: {}", driver.name());

    let fetcher = ThrottledFetcher::new(
        driver,
        BlacklistTracker::new(common),
        ThrottleConfig::from(&settings.throttle),
    );
    let scraper = SiteScraper::new(profile, fetcher, records, blobs);

    scraper.run(&command, &params).await?;
    info!("{} {} finished", site_id, command);

    Ok(())
}
