//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the HTTP
//! fetcher and the full crawl cycle end-to-end.

use link_harvester::config::{Config, CrawlConfig, HttpConfig, OutputConfig, OutputFormat};
use link_harvester::crawler::{http_engine, FetchRequest, Fetcher, HttpFetcher};
use link_harvester::output::export_to_file;
use link_harvester::{FetchError, SourceKind};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with the given depth and default HTTP settings
fn create_test_config(max_depth: u32) -> Config {
    Config {
        crawl: CrawlConfig {
            max_depth,
            max_concurrency: 4,
            timeout_secs: Some(5),
            ..CrawlConfig::default()
        },
        http: HttpConfig::default(),
        output: OutputConfig::default(),
    }
}

/// Mounts an HTML page at `route` that must be requested exactly `hits` times
async fn mount_page(server: &MockServer, route: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(hits)
        .mount(server)
        .await;
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to build URL")
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <script src="/app.js"></script>
            <form action="/search"></form>
            </body></html>"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/page2">Page 2 again</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body><a href="/">Home</a></body></html>"#.to_string(),
        1,
    )
    .await;

    let engine = http_engine(&create_test_config(2)).expect("Failed to build engine");
    let report = engine
        .run(&[format!("{}/", base_url)])
        .await
        .expect("Crawl should succeed");

    let results = report.results();
    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();

    assert!(urls.contains(&url(&mock_server, "/page1").as_str()));
    assert!(urls.contains(&url(&mock_server, "/page2").as_str()));
    assert!(urls.contains(&url(&mock_server, "/app.js").as_str()));
    assert!(urls.contains(&url(&mock_server, "/search").as_str()));
    assert!(urls.contains(&url(&mock_server, "/").as_str()));

    // Unique mode is the default.
    assert_eq!(results.len(), 5);
    assert_eq!(report.stats.pages_extracted, 3);
    assert_eq!(report.stats.pages_failed, 0);
    assert!(report.scope_hint().is_none());
}

#[tokio::test]
async fn test_depth_limit_stops_fetching() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/level1">1</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/level1",
        r#"<a href="/level2">2</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/level2", "<html></html>".to_string(), 0).await;

    let engine = http_engine(&create_test_config(1)).expect("Failed to build engine");
    let report = engine
        .run(&[url(&mock_server, "/").to_string()])
        .await
        .expect("Crawl should succeed");

    // level2 is recorded from level1 but never fetched.
    assert_eq!(report.results().len(), 2);
    assert_eq!(report.stats.deepest_depth, 1);
}

#[tokio::test]
async fn test_script_sources_are_not_fetched() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<script src="/app.js"></script>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/app.js", "console.log(1)".to_string(), 0).await;

    let engine = http_engine(&create_test_config(3)).expect("Failed to build engine");
    let report = engine
        .run(&[url(&mock_server, "/").to_string()])
        .await
        .expect("Crawl should succeed");

    let results = report.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_kind, SourceKind::Script);
}

#[tokio::test]
async fn test_failed_pages_do_not_abort_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">gone</a><a href="/error">error</a><a href="/ok">ok</a>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", "<html></html>".to_string(), 1).await;

    let engine = http_engine(&create_test_config(1)).expect("Failed to build engine");
    let report = engine
        .run(&[url(&mock_server, "/").to_string()])
        .await
        .expect("Crawl should succeed");

    assert_eq!(report.stats.pages_failed, 2);
    assert_eq!(report.stats.pages_extracted, 2);
    assert_eq!(report.results().len(), 3);
}

#[tokio::test]
async fn test_oversized_page_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/big">big</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/big", "x".repeat(4096), 1).await;

    let mut config = create_test_config(1);
    config.crawl.max_body_size = Some(1024);

    let engine = http_engine(&config).expect("Failed to build engine");
    let report = engine
        .run(&[url(&mock_server, "/").to_string()])
        .await
        .expect("Crawl should succeed");

    assert_eq!(report.stats.pages_skipped, 1);
    assert_eq!(report.stats.pages_extracted, 1);
}

#[tokio::test]
async fn test_fetcher_non_success_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forbidden"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let target = url(&mock_server, "/forbidden");
    let result = fetcher.fetch(FetchRequest::new(&target)).await;

    assert_eq!(result, Err(FetchError::NonSuccessStatus(403)));
}

#[tokio::test]
async fn test_fetcher_size_limit() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/big", "y".repeat(2048), 2).await;

    let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let target = url(&mock_server, "/big");

    let limited = fetcher
        .fetch(FetchRequest {
            url: &target,
            timeout: None,
            max_bytes: Some(100),
        })
        .await;
    assert_eq!(limited, Err(FetchError::TooLarge { limit: 100 }));

    let unlimited = fetcher.fetch(FetchRequest::new(&target)).await.unwrap();
    assert_eq!(unlimited.len(), 2048);
}

#[tokio::test]
async fn test_fetcher_decodes_declared_charset() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![b'c', b'a', b'f', 0xE9], "text/html; charset=iso-8859-1"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let target = url(&mock_server, "/latin1");
    let body = fetcher.fetch(FetchRequest::new(&target)).await.unwrap();

    assert_eq!(body, "café");
}

#[tokio::test]
async fn test_fetcher_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let target = url(&mock_server, "/slow");
    let result = fetcher
        .fetch(FetchRequest {
            url: &target,
            timeout: Some(Duration::from_millis(200)),
            max_bytes: None,
        })
        .await;

    assert_eq!(result, Err(FetchError::Timeout));
}

#[tokio::test]
async fn test_fetcher_sends_custom_headers_and_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("x-token", "secret"))
        .and(header(
            "user-agent",
            link_harvester::config::DEFAULT_USER_AGENT,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = HttpConfig::default();
    config
        .headers
        .insert("X-Token".to_string(), "secret".to_string());

    let fetcher = HttpFetcher::new(&config).unwrap();
    let target = url(&mock_server, "/private");
    let body = fetcher.fetch(FetchRequest::new(&target)).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_fetcher_custom_user_agent_overrides_default() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestBot/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = HttpConfig::default();
    config
        .headers
        .insert("User-Agent".to_string(), "HarvestBot/2.0".to_string());

    let fetcher = HttpFetcher::new(&config).unwrap();
    let target = url(&mock_server, "/");
    assert!(fetcher.fetch(FetchRequest::new(&target)).await.is_ok());
}

#[tokio::test]
async fn test_fetcher_redirect_policy() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", "moved here".to_string(), 1).await;

    let target = url(&mock_server, "/old");

    let following = HttpFetcher::new(&HttpConfig::default()).unwrap();
    let body = following.fetch(FetchRequest::new(&target)).await.unwrap();
    assert_eq!(body, "moved here");

    let config = HttpConfig {
        follow_redirects: false,
        ..HttpConfig::default()
    };
    let not_following = HttpFetcher::new(&config).unwrap();
    let result = not_following.fetch(FetchRequest::new(&target)).await;
    assert_eq!(result, Err(FetchError::NonSuccessStatus(301)));
}

#[tokio::test]
async fn test_crawl_and_export_json() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/about">About</a><script src="/main.js"></script>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/about", "<html></html>".to_string(), 1).await;

    let mut config = create_test_config(1);
    config.output.format = OutputFormat::Json;

    let engine = http_engine(&config).expect("Failed to build engine");
    let report = engine
        .run(&[url(&mock_server, "/").to_string()])
        .await
        .expect("Crawl should succeed");

    let file = tempfile::NamedTempFile::new().unwrap();
    export_to_file(&report.results(), &config.output, file.path()).unwrap();

    let written = std::fs::read_to_string(file.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    let array = value.as_array().unwrap();

    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["url"], url(&mock_server, "/about").as_str());
    assert_eq!(array[0]["source"], "href");
    assert_eq!(array[0]["where"], url(&mock_server, "/").as_str());
    assert_eq!(array[1]["source"], "script");
}
