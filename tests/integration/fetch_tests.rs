//! Fetcher and loader tests against a mock HTTP server

use crate::common::{gzip, serve_gz, serve_status, urlset};
use sitemap_sync::config::UserAgentConfig;
use sitemap_sync::crawler::{
    build_http_client, FetchError, Fetcher, HttpNodeLoader, NodeError, NodeLoader, ScratchDir,
    SitemapNode,
};
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(scratch: &std::path::Path) -> Fetcher {
    let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
    Fetcher::new(client, ScratchDir::new(scratch.join("run")))
}

#[tokio::test]
async fn test_fetch_stages_body_verbatim() {
    let server = MockServer::start().await;
    let body = gzip(&urlset(&["https://x/1"]));
    Mock::given(method("GET"))
        .and(path("/maps/sitemap_1.xml.gz"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = fetcher(dir.path());

    let staged = fetcher
        .fetch(&format!("{}/maps/sitemap_1.xml.gz", server.uri()))
        .await
        .unwrap();

    assert_eq!(staged, dir.path().join("run").join("sitemap_1.xml.gz"));
    assert_eq!(std::fs::read(&staged).unwrap(), body);
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let server = MockServer::start().await;
    serve_status(&server, "/missing.xml.gz", 404).await;

    let dir = tempfile::tempdir().unwrap();
    let result = fetcher(dir.path())
        .fetch(&format!("{}/missing.xml.gz", server.uri()))
        .await;

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_closed_port_is_unreachable_error() {
    // Bind then drop a listener so nothing accepts on the port
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let dir = tempfile::tempdir().unwrap();
    let result = fetcher(dir.path())
        .fetch(&format!("http://127.0.0.1:{}/sitemap.xml.gz", port))
        .await;
    assert!(
        matches!(result, Err(FetchError::Unreachable { .. })),
        "expected unreachable error, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client =
        build_http_client(&UserAgentConfig::default(), Duration::from_millis(200)).unwrap();
    let fetcher = Fetcher::new(client, ScratchDir::new(dir.path().join("run")));

    let result = fetcher
        .fetch(&format!("{}/slow.xml.gz", server.uri()))
        .await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_http_loader_returns_parsed_node() {
    let server = MockServer::start().await;
    serve_gz(&server, "/leaf.xml.gz", &urlset(&["https://x/1", "https://x/2"])).await;

    let dir = tempfile::tempdir().unwrap();
    let loader = HttpNodeLoader::new(fetcher(dir.path()));

    let node = loader
        .load(&format!("{}/leaf.xml.gz", server.uri()))
        .await
        .unwrap();
    assert_eq!(
        node,
        SitemapNode::UrlSet(vec!["https://x/1".to_string(), "https://x/2".to_string()])
    );
}

#[tokio::test]
async fn test_http_loader_maps_fetch_failure() {
    let server = MockServer::start().await;
    serve_status(&server, "/leaf.xml.gz", 503).await;

    let dir = tempfile::tempdir().unwrap();
    let loader = HttpNodeLoader::new(fetcher(dir.path()));

    let result = loader
        .load(&format!("{}/leaf.xml.gz", server.uri()))
        .await;
    assert!(matches!(result, Err(NodeError::Fetch(_))));
}
