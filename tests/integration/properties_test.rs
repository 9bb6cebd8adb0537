// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{no_throttle, test_site, StubDriver};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use stashrs::domain::models::chapter::ChapterKey;
use stashrs::domain::models::record::FragmentRef;
use stashrs::domain::repositories::blob_repository::BlobRepository;
use stashrs::domain::repositories::record_repository::RecordRepository;
use stashrs::domain::services::aggregation_service::{group_fragments, AggregationService, AggregationSpec};
use stashrs::domain::services::blacklist::{BlacklistTracker, BLACKLIST_COLLECTION};
use stashrs::domain::services::throttled_fetcher::ThrottledFetcher;
use stashrs::infrastructure::database::memory_store::MemoryRecordStore;
use stashrs::infrastructure::storage::InMemoryBlobStore;
use stashrs::sites;
use stashrs::utils::text::numeric_less;

#[tokio::test]
async fn test_blacklisted_url_is_never_sent_to_driver() {
    let driver = Arc::new(StubDriver::new().page("https://example.com/a", "<html></html>"));
    let blacklist = BlacklistTracker::new(Arc::new(MemoryRecordStore::new()));
    let fetcher = ThrottledFetcher::new(driver.clone(), blacklist.clone(), no_throttle());

    blacklist.blacklist_url("https://example.com/a").await.unwrap();

    assert!(fetcher.goto("https://example.com/a").await.unwrap().is_none());
    assert!(driver.visited().is_empty());
}

#[tokio::test]
async fn test_double_blacklist_leaves_one_record() {
    let store = Arc::new(MemoryRecordStore::new());
    let blacklist = BlacklistTracker::new(store.clone());

    blacklist.blacklist_url("https://example.com/x").await.unwrap();
    blacklist.blacklist_url("https://example.com/x").await.unwrap();

    assert_eq!(store.count(BLACKLIST_COLLECTION).await.unwrap(), 1);
    assert!(blacklist.is_blacklisted("https://example.com/x").await.unwrap());
}

#[tokio::test]
async fn test_scrape_then_lookup_and_repeat_keeps_one_record() {
    let book = r#"<html><body><div class="title"><h1>书</h1></div></body></html>"#;
    let site = test_site(
        sites::find("piaotian").unwrap(),
        StubDriver::new().page("https://www.ptwxz.com/book/1/", book),
    );

    let first = site.scraper.scrape("book", &[json!("1")]).await.unwrap();
    let stored = site.scraper.find_record("book", "1").await.unwrap();
    assert_eq!(first.record(), stored.as_ref());

    site.scraper.scrape("book", &[json!("1")]).await.unwrap();
    assert_eq!(site.records.count("book").await.unwrap(), 1);
    assert_eq!(site.records.upserts(), 2);
}

#[test]
fn test_grouping_law() {
    let ids = ["3_1", "1_1", "2_2", "1_2", "2_1", "3_2", "1_3"];
    let fragments: Vec<FragmentRef> = ids.iter().map(|id| FragmentRef::new(*id, "", "")).collect();

    let chapters = group_fragments(&fragments, |f| {
        ChapterKey::new(f.id.split('_').next().unwrap_or_default().to_string())
    });

    let grouped: Vec<&str> = chapters.iter().flat_map(|c| c.fragment_ids()).collect();
    let unique: HashSet<&str> = grouped.iter().copied().collect();
    assert_eq!(grouped.len(), ids.len());
    assert_eq!(unique, ids.iter().copied().collect::<HashSet<_>>());
}

#[tokio::test]
async fn test_sorting_law() {
    let blobs = Arc::new(InMemoryBlobStore::new());
    for id in ["1", "2", "3"] {
        blobs.write("item/_fragment", id, id).await.unwrap();
    }

    let spec = AggregationSpec::new(
        ["2", "1", "3"].iter().map(|id| FragmentRef::new(*id, "", "")).collect(),
        "_out",
        |_| ChapterKey::new("all"),
        |a, b| numeric_less(&a.id, &b.id),
    );
    AggregationService::new(blobs.clone())
        .aggregate("item", spec)
        .await
        .unwrap();

    assert_eq!(blobs.read("item/_out/all").await.unwrap().as_deref(), Some("1\n2\n3"));
}
