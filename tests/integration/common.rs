//! Shared helpers for the integration tests

use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_sync::config::Config;
use std::io::Write;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

pub fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{}</loc></sitemap>", c))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

pub fn urlset(locations: &[&str]) -> String {
    let entries: String = locations
        .iter()
        .map(|l| format!("<url><loc>{}</loc></url>", l))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Serves `body` gzip-compressed at `route`
pub async fn serve_gz(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(body)))
        .mount(server)
        .await;
}

pub async fn serve_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serves an index over leaves `a` and `b`, and leaf a = {1, 2}
///
/// Leaf `b` is left to the caller.
pub async fn mount_index_with_leaf_a(server: &MockServer) -> String {
    let base = server.uri();
    serve_gz(
        server,
        "/sitemap_index.xml.gz",
        &sitemap_index(&[format!("{}/a.xml.gz", base), format!("{}/b.xml.gz", base)]),
    )
    .await;
    serve_gz(server, "/a.xml.gz", &urlset(&["https://x/1", "https://x/2"])).await;
    format!("{}/sitemap_index.xml.gz", base)
}

/// Configuration with every path under `dir`
pub fn test_config(dir: &Path, root_url: &str) -> Config {
    let mut config = Config::default();
    config.sitemap.root_url = root_url.to_string();
    config.sitemap.scratch_dir = dir.join("temp");
    config.sitemap.request_timeout_secs = 5;
    config.export.directory = dir.to_path_buf();
    config.store.sqlite_path = dir.join("urls.db");
    config.store.retry_delay_ms = 10;
    config
}
