// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{no_throttle, StubDriver};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use stashrs::config::settings::StorageSettings;
use stashrs::domain::services::blacklist::BlacklistTracker;
use stashrs::domain::services::site_scraper::SiteScraper;
use stashrs::domain::services::throttled_fetcher::ThrottledFetcher;
use stashrs::infrastructure::database::disk_store::DiskRecordStore;
use stashrs::infrastructure::storage::create_blob_repository;
use stashrs::sites;

const BOOK_HTML: &str = r#"
<html><body>
    <div class="title"><h1>飘天测试</h1></div>
    <div class="mainbody"><div class="centent"><ul>
        <li><a href="https://www.ptwxz.com/html/9/9001/1.html">第一章</a></li>
        <li><a href="2.html">第二章</a></li>
    </ul></div></div>
</body></html>
"#;

const CHAPTER_1: &str = r#"<html><body><div id="content">第一章<br /><br />
&nbsp;&nbsp;甲。<br /><br />&nbsp;&nbsp;乙。</div></body></html>"#;

const CHAPTER_2: &str = r#"<html><body><div id="content">第二章<br /><br />&nbsp;&nbsp;丙。</div></body></html>"#;

fn scraper_in(temp: &TempDir) -> SiteScraper {
    let storage = StorageSettings {
        stash_path: temp.path().join("stash").to_string_lossy().to_string(),
        db_path: temp.path().join("db").to_string_lossy().to_string(),
    };
    let driver = StubDriver::new()
        .page("https://www.ptwxz.com/book/9001/", BOOK_HTML)
        .page("https://www.ptwxz.com/html/9/9001/1.html", CHAPTER_1)
        .page("https://www.ptwxz.com/book/9001/2.html", CHAPTER_2);

    let fetcher = ThrottledFetcher::new(
        Arc::new(driver),
        BlacklistTracker::new(Arc::new(DiskRecordStore::new(&storage.db_path, "common"))),
        no_throttle(),
    );
    SiteScraper::new(
        Arc::new(sites::find("piaotian").unwrap()),
        fetcher,
        Arc::new(DiskRecordStore::new(&storage.db_path, "piaotian")),
        create_blob_repository(&storage, "piaotian"),
    )
}

#[tokio::test]
async fn test_piaotian_book_on_disk() {
    let temp = TempDir::new().unwrap();
    let scraper = scraper_in(&temp);

    scraper.run("scrapeBook", &[json!("9001")]).await.unwrap();
    scraper.run("buildBook", &[json!("9001"), json!("html")]).await.unwrap();

    let stash = temp.path().join("stash").join("piaotian").join("9001");
    let body = std::fs::read_to_string(stash.join("_fragment").join("1")).unwrap();
    assert_eq!(body, "甲。\n乙。");
    assert!(stash.join("_html").join("01-第一章.html").exists());
    assert!(stash.join("_html").join("02-第二章.html").exists());

    let mobi = std::fs::read_to_string(stash.join("_mobi").join("飘天测试.html")).unwrap();
    assert!(mobi.contains("<h2>第一章</h2>"));
    assert!(mobi.contains("<p>丙。</p>"));

    let db = temp.path().join("db");
    assert!(db.join("piaotian").join("book.json").exists());
    assert!(db.join("piaotian").join("fragment.json").exists());
}

#[tokio::test]
async fn test_records_visible_to_a_new_scraper() {
    let temp = TempDir::new().unwrap();
    scraper_in(&temp)
        .scrape("book", &[json!("9001")])
        .await
        .unwrap();

    let reopened = scraper_in(&temp);
    let book = reopened.find_record("book", "9001").await.unwrap().unwrap();
    assert_eq!(book.get_str("title"), Some("飘天测试"));

    let fragments = book.fragments().unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[1].url, "https://www.ptwxz.com/book/9001/2.html");
}
