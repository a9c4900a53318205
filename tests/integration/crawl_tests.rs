//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end with the reqwest transport and the
//! scraper parser.

use std::sync::Arc;
use sumi_sitemap::config::Config;
use sumi_sitemap::crawler::{crawl, CrawlEngine, CrawlOptions, HtmlParser, ReqwestTransport};
use sumi_sitemap::output::{format_text_site_map, OutputFormat};
use sumi_sitemap::{ConfigError, CrawlError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page with one anchor per href
fn html_page(title: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<li><a href=\"{}\">{}</a></li>\n", href, href))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><title>{}</title></head>\n<body><ul>\n{}</ul></body></html>",
        title, anchors
    )
}

/// Mounts a 200 page that must be requested exactly once
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout = 5;
    config.crawler.backoff_unit_ms = 10;
    config.user_agent.pool = vec!["IntegrationBot/1.0".to_string()];
    config
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", html_page("Home", &["/about", "/blog"])).await;
    mount_page(
        &mock_server,
        "/about",
        html_page("About", &["/", "/blog/post-1"]),
    )
    .await;
    mount_page(
        &mock_server,
        "/blog",
        html_page("Blog", &["/blog/post-1", "https://external.example/"]),
    )
    .await;
    mount_page(&mock_server, "/blog/post-1", html_page("Post", &["../about"])).await;

    let (stats, site_data) = crawl(&root, &test_config()).await.unwrap();

    assert_eq!(stats.pages_parsed, 4);
    assert_eq!(stats.pages_unavailable, 0);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(site_data.len(), 4);

    let blog = &site_data[&format!("{}/blog", mock_server.uri())];
    assert!(blog.contains("https://external.example/"));
    assert!(blog.contains(&format!("{}/blog/post-1", mock_server.uri())));

    let post = &site_data[&format!("{}/blog/post-1", mock_server.uri())];
    assert!(post.contains(&format!("{}/about", mock_server.uri())));
}

#[tokio::test]
async fn test_missing_pages_are_recorded_as_unavailable() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", html_page("Home", &["/missing", "/error"])).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    // Server errors are a response, so they are not retried
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, site_data) = crawl(&root, &test_config()).await.unwrap();

    assert_eq!(stats.pages_parsed, 1);
    assert_eq!(stats.pages_unavailable, 2);
    assert_eq!(site_data.len(), 1);
    assert_eq!(site_data[&root].len(), 2);
}

#[tokio::test]
async fn test_page_limit_stops_dispatch() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    mount_page(
        &mock_server,
        "/",
        html_page("Home", &["/p1", "/p2", "/p3", "/p4", "/p5"]),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Leaf", &[])))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.crawler.max_page_limit = Some(3);

    let (stats, site_data) = crawl(&root, &config).await.unwrap();

    assert_eq!(stats.pages_dispatched, 3);
    assert_eq!(site_data.len(), 3);
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_cross_domain_links_are_recorded_not_followed() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());
    let port = mock_server.address().port();

    // Same server, different host spelling
    let offsite = format!("http://localhost:{}/offsite", port);
    mount_page(&mock_server, "/", html_page("Home", &[offsite.as_str()])).await;
    Mock::given(method("GET"))
        .and(path("/offsite"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_, site_data) = crawl(&root, &test_config()).await.unwrap();

    assert_eq!(site_data.len(), 1);
    assert!(site_data[&root].contains(&offsite));
}

#[tokio::test]
async fn test_user_agent_comes_from_pool() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "IntegrationBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html_page("Home", &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, _) = crawl(&root, &test_config()).await.unwrap();
    assert_eq!(stats.pages_parsed, 1);
}

#[tokio::test]
async fn test_unreachable_root_fails_page_not_crawl() {
    // Bind then drop a listener to get a port nothing is listening on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let root = format!("http://127.0.0.1:{}/", port);

    let mut config = test_config();
    config.crawler.max_attempts = 2;

    let (stats, site_data) = crawl(&root, &config).await.unwrap();

    assert_eq!(stats.pages_failed, 1);
    assert!(site_data.is_empty());
}

#[tokio::test]
async fn test_engine_output_renders_text() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", html_page("Home", &["/only"])).await;
    mount_page(&mock_server, "/only", html_page("Only", &[])).await;

    let config = test_config();
    let engine = CrawlEngine::new(
        &root,
        Arc::new(ReqwestTransport::new().unwrap()),
        HtmlParser,
        CrawlOptions::from_config(&config),
    )
    .unwrap();
    engine.crawl().await.unwrap();

    let text = format_text_site_map(&engine.site_data().unwrap());
    let only = format!("{}/only", mock_server.uri());
    assert_eq!(
        text,
        format!("{root}\n  - {only}\n\n{only}\n\n", root = root, only = only)
    );
    assert_eq!(OutputFormat::default(), OutputFormat::Text);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_crawling() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.crawler.max_attempts = 0;

    let result = crawl(&format!("{}/", mock_server.uri()), &config).await;
    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_zero_page_limit_crawls_everything() {
    let mock_server = MockServer::start().await;
    let root = format!("{}/", mock_server.uri());

    mount_page(&mock_server, "/", html_page("Home", &["/a", "/b"])).await;
    mount_page(&mock_server, "/a", html_page("A", &[])).await;
    mount_page(&mock_server, "/b", html_page("B", &[])).await;

    let mut config = test_config();
    config.crawler.max_page_limit = Some(0);

    let (stats, site_data) = crawl(&root, &config).await.unwrap();

    assert_eq!(stats.pages_parsed, 3);
    assert_eq!(site_data.len(), 3);
}
