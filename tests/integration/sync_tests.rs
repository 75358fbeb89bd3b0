//! End-to-end sync tests
//!
//! These tests serve gzip-compressed sitemap trees from a wiremock server
//! and run the full resolve → export → replace pipeline against SQLite.

use crate::common::{
    mount_index_with_leaf_a, serve_gz, serve_status, test_config, urlset,
};
use chrono::NaiveDate;
use sitemap_sync::output::{read_snapshot, snapshot_file_name};
use sitemap_sync::pipeline::{active_row_count, replace_active_table};
use sitemap_sync::{run_until, DiscoveredSet, Phase, RunOptions, SyncError};
use wiremock::MockServer;

fn snapshot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
}

fn options(skip_replace: bool) -> RunOptions {
    RunOptions {
        skip_replace,
        snapshot_date: Some(snapshot_date()),
    }
}

fn set(urls: &[&str]) -> DiscoveredSet {
    urls.iter().copied().collect()
}

#[tokio::test]
async fn test_full_sync_two_leaves() {
    let server = MockServer::start().await;
    let root = mount_index_with_leaf_a(&server).await;
    serve_gz(&server, "/b.xml.gz", &urlset(&["https://x/2", "https://x/3"])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &root);

    let summary = run_until(config.clone(), options(false), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.urls, 3);
    assert_eq!(summary.report.nodes_loaded, 3);
    assert!(summary.report.warnings.is_empty());

    // Snapshot round-trip
    let expected = set(&["https://x/1", "https://x/2", "https://x/3"]);
    assert_eq!(
        summary.snapshot,
        dir.path()
            .join(snapshot_file_name("Apt_active_ids_", snapshot_date()))
    );
    assert_eq!(read_snapshot(&summary.snapshot).unwrap(), expected);

    // Active table holds the new set
    let replace = summary.replace.unwrap();
    assert_eq!(replace.rows, 3);
    assert_eq!(active_row_count(&config).await.unwrap(), 3);

    // Staged and decoded files are kept under a run-scoped scratch directory
    let runs: Vec<_> = std::fs::read_dir(dir.path().join("temp"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(runs.len(), 1);
    assert!(runs[0].join("a.xml.gz").exists());
    assert!(runs[0].join("a.xml").exists());
}

#[tokio::test]
async fn test_failed_leaf_still_replaces_with_remaining_urls() {
    let server = MockServer::start().await;
    let root = mount_index_with_leaf_a(&server).await;
    serve_status(&server, "/b.xml.gz", 500).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &root);

    let summary = run_until(config.clone(), options(false), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.urls, 2);
    assert_eq!(summary.report.warning_count(), 1);
    assert_eq!(
        read_snapshot(&summary.snapshot).unwrap(),
        set(&["https://x/1", "https://x/2"])
    );
    assert_eq!(active_row_count(&config).await.unwrap(), 2);
}

#[tokio::test]
async fn test_unrecognized_leaf_is_tolerated() {
    let server = MockServer::start().await;
    let root = mount_index_with_leaf_a(&server).await;
    serve_gz(&server, "/b.xml.gz", "<html><body>maintenance</body></html>").await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &root);

    let summary = run_until(config, options(true), std::future::pending())
        .await
        .unwrap();
    assert_eq!(summary.urls, 2);
    assert!(summary.report.warning_count() >= 1);
}

#[tokio::test]
async fn test_uncompressed_leaf_is_a_failed_node() {
    let server = MockServer::start().await;
    let root = mount_index_with_leaf_a(&server).await;
    wiremock::Mock::given(wiremock::matchers::path("/b.xml.gz"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(urlset(&["https://x/9"])),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &root);

    let summary = run_until(config, options(true), std::future::pending())
        .await
        .unwrap();
    assert_eq!(summary.urls, 2);
    assert_eq!(summary.report.failed_nodes(), 1);
}

#[tokio::test]
async fn test_root_not_found_fails_resolve_and_keeps_table() {
    let server = MockServer::start().await;
    serve_status(&server, "/sitemap_index.xml.gz", 404).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &format!("{}/sitemap_index.xml.gz", server.uri()));

    // Seed the active table from an earlier run
    replace_active_table(&config, set(&["https://x/old"]))
        .await
        .unwrap();

    let err = run_until(config.clone(), options(false), std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Resolve(_)));
    assert_eq!(err.phase(), Phase::Resolve);
    assert_eq!(err.exit_code(), 2);
    assert_eq!(active_row_count(&config).await.unwrap(), 1);
    assert!(!dir
        .path()
        .join(snapshot_file_name("Apt_active_ids_", snapshot_date()))
        .exists());
}

#[tokio::test]
async fn test_empty_result_does_not_wipe_table() {
    let server = MockServer::start().await;
    serve_gz(&server, "/sitemap.xml.gz", &urlset(&[])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &format!("{}/sitemap.xml.gz", server.uri()));
    replace_active_table(&config, set(&["https://x/old"]))
        .await
        .unwrap();

    let err = run_until(config.clone(), options(false), std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::EmptyResult { .. }));
    assert_eq!(active_row_count(&config).await.unwrap(), 1);
}

#[tokio::test]
async fn test_allow_empty_replaces_with_empty_table() {
    let server = MockServer::start().await;
    serve_gz(&server, "/sitemap.xml.gz", &urlset(&[])).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), &format!("{}/sitemap.xml.gz", server.uri()));
    config.store.allow_empty = true;
    replace_active_table(&config, set(&["https://x/old"]))
        .await
        .unwrap();

    let summary = run_until(config.clone(), options(false), std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.urls, 0);
    assert_eq!(active_row_count(&config).await.unwrap(), 0);
}

#[tokio::test]
async fn test_skip_replace_leaves_store_untouched() {
    let server = MockServer::start().await;
    let root = mount_index_with_leaf_a(&server).await;
    serve_gz(&server, "/b.xml.gz", &urlset(&["https://x/3"])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &root);

    let summary = run_until(config, options(true), std::future::pending())
        .await
        .unwrap();

    assert!(summary.replace.is_none());
    assert!(summary.snapshot.exists());
    assert!(!dir.path().join("urls.db").exists());
}
