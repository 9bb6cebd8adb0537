// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::DriverSettings;
use crate::engines::http_driver::HttpDriver;
use crate::engines::traits::PageDriver;
use encoding_rs::GBK;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn driver_settings() -> DriverSettings {
    DriverSettings {
        kind: "http".to_string(),
        remote_debugging_url: None,
        user_data_dir: None,
        user_agent: None,
        request_timeout_secs: 10,
        cache_capacity: 16,
    }
}

#[tokio::test]
async fn test_second_visit_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/book/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string("<html><body><h1>Test</h1></body></html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let driver = HttpDriver::new(&driver_settings()).unwrap();
    let url = format!("{}/book/1/", server.uri());

    let first = driver.goto(&url).await.unwrap();
    assert_eq!(first.status_code, 200);
    assert!(!first.from_cache);
    assert!(first.content.contains("<h1>Test</h1>"));

    let second = driver.goto(&url).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.content, first.content);
}

#[tokio::test]
async fn test_not_found_is_returned_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let driver = HttpDriver::new(&driver_settings()).unwrap();
    let url = format!("{}/missing", server.uri());

    let first = driver.goto(&url).await.unwrap();
    assert!(first.is_not_found());
    let second = driver.goto(&url).await.unwrap();
    assert!(!second.from_cache);
}

#[tokio::test]
async fn test_gbk_page_is_decoded() {
    let server = MockServer::start().await;
    let (body, _, _) = GBK.encode("<html><head><meta charset=\"gbk\"></head><body><div id=\"content\">第一章 风起</div></body></html>");
    Mock::given(method("GET"))
        .and(path("/1.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(body.into_owned()),
        )
        .mount(&server)
        .await;

    let driver = HttpDriver::new(&driver_settings()).unwrap();
    let page = driver.goto(&format!("{}/1.html", server.uri())).await.unwrap();
    assert!(page.content.contains("第一章 风起"));
}
