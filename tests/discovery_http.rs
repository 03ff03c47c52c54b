//! Listing-page discovery over HTTP against a mock server.

use std::time::Duration;

use shopmap::{DiscoveryError, HttpDiscovery, SourceDiscovery};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <script>
    window.rosterLinks = ["https://happy-kaimonoken.info/wp-content/uploads/2025/06/daiten_250616.pdf"];
  </script>
</head>
<body>
  <h2>取扱店舗検索</h2>
  <a href="/wp-content/uploads/2025/07/tempo_250714.pdf">取扱店舗一覧（PDF）</a>
  <a href="/wp-content/uploads/2025/07/tempo_250714.pdf">取扱店舗一覧（再掲）</a>
  <a href="/wp-content/uploads/2025/07/poster.pdf">ポスター</a>
</body>
</html>"#;

async fn discovery_for(server: &MockServer) -> HttpDiscovery {
    HttpDiscovery::new(
        reqwest::Client::new(),
        format!("{}/tenposearch/", server.uri()),
        &server.uri(),
        Duration::from_secs(5),
    )
    .expect("valid base URL")
}

#[tokio::test]
async fn test_discovers_rosters_from_listing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenposearch/"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = discovery_for(&server).await;
    let urls = discovery.discover().await.expect("discovery succeeds");

    assert_eq!(
        urls,
        vec![
            // Sorted: the mock server's http:// URL comes before https://
            format!("{}/wp-content/uploads/2025/07/tempo_250714.pdf", server.uri()),
            "https://happy-kaimonoken.info/wp-content/uploads/2025/06/daiten_250616.pdf".to_string(),
        ]
    );
    assert!(discovery.source().ends_with("/tenposearch/"));
}

#[tokio::test]
async fn test_error_status_is_a_discovery_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenposearch/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = discovery_for(&server)
        .await
        .discover()
        .await
        .expect_err("503 must fail");
    assert!(matches!(err, DiscoveryError::Status(503)));
}

#[tokio::test]
async fn test_timeout_is_a_discovery_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LISTING_PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let discovery = HttpDiscovery::new(
        reqwest::Client::new(),
        format!("{}/tenposearch/", server.uri()),
        &server.uri(),
        Duration::from_millis(200),
    )
    .expect("valid base URL");

    let err = discovery.discover().await.expect_err("slow page must time out");
    assert!(matches!(err, DiscoveryError::Request(ref e) if e.is_timeout()));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let result = HttpDiscovery::new(
        reqwest::Client::new(),
        "https://happy-kaimonoken.info/tenposearch/",
        "not a url",
        Duration::from_secs(5),
    );
    assert!(matches!(result, Err(DiscoveryError::InvalidUrl { .. })));
}
