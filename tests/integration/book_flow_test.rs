// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{read_blob, test_site, StubDriver, TestSite};
use serde_json::{json, Value};
use stashrs::domain::repositories::record_repository::RecordRepository;
use stashrs::domain::services::site_scraper::{ScrapeOutcome, SkipReason};
use stashrs::sites;
use stashrs::utils::errors::ScraperError;

const BOOK_URL: &str = "https://cn.uukanshu.cc/book/123/";

const BOOK_HTML: &str = r#"
<html><body>
    <div class="book">
        <div class="bookinfo">
            <h1 class="booktitle">测试小说</h1>
            <div class="p bookintro"><img src="/cover/123.jpg" title="测试小说">一本测试用的小说。</div>
            <div class="booktag"><a class="red" href="/author/1"> 某作者 </a></div>
        </div>
    </div>
    <dl id="list-chapterAll">
        <dd><a href="/book/123/1.html">第一章 开端</a></dd>
        <dd><a href="/book/123/2.html">第二章 发展</a></dd>
        <dd><a href="/book/123/3.html">第三章 缺页</a></dd>
    </dl>
</body></html>
"#;

const CHAPTER_1: &str = r#"<html><body><div class="book"><div class="readcotent bbb">
　　第一句。<br><br>　　第二句。<br>
</div></div></body></html>"#;

const CHAPTER_2: &str = r#"<html><body><div class="book"><div class="readcotent bbb">　　第三句。</div></div></body></html>"#;

fn uukancc_site() -> TestSite {
    let driver = StubDriver::new()
        .page(BOOK_URL, BOOK_HTML)
        .page("https://cn.uukanshu.cc/book/123/1.html", CHAPTER_1)
        .page("https://cn.uukanshu.cc/book/123/2.html", CHAPTER_2)
        .status("https://cn.uukanshu.cc/book/123/3.html", 404);
    test_site(sites::find("uukancc").unwrap(), driver)
}

#[tokio::test]
async fn test_book_scrape_upserts_once_with_expected_shape() {
    let site = uukancc_site();

    let outcome = site.scraper.scrape("book", &[json!("123")]).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(site.records.upserts(), 1);

    let stored = site.records.find_one("book", "123").await.unwrap().unwrap();
    assert_eq!(
        stored,
        json!({
            "id": "123",
            "title": "测试小说",
            "coverImg": { "src": "https://cn.uukanshu.cc/cover/123.jpg", "title": "测试小说" },
            "description": "一本测试用的小说。",
            "author": "某作者",
            "fragments": [
                { "id": "1", "name": "第一章 开端", "url": "https://cn.uukanshu.cc/book/123/1.html" },
                { "id": "2", "name": "第二章 发展", "url": "https://cn.uukanshu.cc/book/123/2.html" },
                { "id": "3", "name": "第三章 缺页", "url": "https://cn.uukanshu.cc/book/123/3.html" }
            ]
        })
    );
    assert_eq!(outcome.into_record().map(|r| r.into_value()), Some(stored));
}

#[tokio::test]
async fn test_scrape_book_run_saves_fragments_and_blacklists_missing_page() {
    let site = uukancc_site();

    site.scraper.run("scrapeBook", &[json!("123")]).await.unwrap();

    assert_eq!(
        read_blob(&site.blobs, "123/_fragment/1").await.as_deref(),
        Some("第一句。\n\n第二句。")
    );
    assert_eq!(read_blob(&site.blobs, "123/_fragment/2").await.as_deref(), Some("第三句。"));
    assert_eq!(read_blob(&site.blobs, "123/_fragment/3").await, None);

    let fragment = site.records.find_one("fragment", "123/1").await.unwrap().unwrap();
    assert_eq!(fragment["bookId"], "123");
    assert_eq!(fragment["fragmentId"], "1");
    assert_eq!(fragment["name"], "第一章 开端");
    assert!(fragment.get("rawContent").is_none());

    assert!(site
        .common
        .find_one("blacklistUrl", "https://cn.uukanshu.cc/book/123/3.html")
        .await
        .unwrap()
        .is_some());
    assert_eq!(site.records.count("fragment").await.unwrap(), 2);

    // the blacklisted page is not fetched again
    let fragment_3 = json!({ "id": "3", "name": "第三章 缺页", "url": "https://cn.uukanshu.cc/book/123/3.html" });
    let outcome = site
        .scraper
        .scrape("fragment", &[json!("123"), fragment_3])
        .await
        .unwrap();
    assert!(matches!(outcome, ScrapeOutcome::Skipped(SkipReason::Blacklisted { .. })));
    let visits = site
        .driver
        .visited()
        .iter()
        .filter(|url| url.ends_with("/3.html"))
        .count();
    assert_eq!(visits, 1);
}

#[tokio::test]
async fn test_build_book_txt() {
    let site = uukancc_site();
    site.scraper.run("scrapeBook", &[json!("123")]).await.unwrap();

    site.scraper.run("buildBook", &[json!("123"), json!("txt")]).await.unwrap();

    assert_eq!(
        read_blob(&site.blobs, "123/_fulltxt/测试小说.txt").await.as_deref(),
        Some("第一句。\n\n第二句。\n第三句。")
    );
}

#[tokio::test]
async fn test_build_book_html_pages_and_full_book() {
    let site = uukancc_site();
    site.scraper.run("scrapeBook", &[json!("123")]).await.unwrap();

    site.scraper.run("buildBook", &[json!("123"), json!("html")]).await.unwrap();

    let first = read_blob(&site.blobs, "123/_html/001-第一章 开端.html").await.unwrap();
    assert!(first.contains("<h2>第一章 开端</h2>"));
    assert!(first.contains("<p>第一句。</p>"));
    assert!(first.contains("prevFileName=''"));
    assert!(first.contains("nextFileName='002-第二章 发展.html'"));

    let second = read_blob(&site.blobs, "123/_html/002-第二章 发展.html").await.unwrap();
    assert!(second.contains("prevFileName='001-第一章 开端.html'"));

    // chapter with a missing body is still written
    assert!(read_blob(&site.blobs, "123/_html/003-第三章 缺页.html").await.is_some());

    let full = read_blob(&site.blobs, "123/_html/_full.html").await.unwrap();
    assert!(full.contains("<br />\n第一句。"));
    assert!(!full.contains("<p>"));
    assert!(full.find("第一章").unwrap() < full.find("第二章").unwrap());

    let listed: Vec<String> = site
        .blobs
        .paths()
        .await
        .into_iter()
        .filter(|p| p.starts_with("123/_html/"))
        .collect();
    assert_eq!(listed.len(), 4);
}

#[tokio::test]
async fn test_build_book_for_unknown_item_fails() {
    let site = uukancc_site();
    let err = site
        .scraper
        .run("buildBook", &[Value::String("999".into())])
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Profile(_)));
    assert!(site.driver.visited().is_empty());
}
