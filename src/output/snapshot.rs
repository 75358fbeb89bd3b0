//! Dated CSV snapshots of a discovered URL set
//!
//! A snapshot is an audit artifact: one URL per row under a single unnamed
//! column (header `0`), written once per day and never read by the sync run
//! itself.

use crate::state::DiscoveredSet;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header label of the single snapshot column
pub const SNAPSHOT_HEADER: &str = "0";

/// Errors that can occur while writing or reading a snapshot
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write snapshot {}: {source}", .path.display())]
    Write { path: PathBuf, source: csv::Error },

    #[error("Failed to read snapshot {}: {source}", .path.display())]
    Read { path: PathBuf, source: csv::Error },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Builds the snapshot file name for a given day, e.g. `Apt_active_ids_07_03_2025.csv`
pub fn snapshot_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}{}.csv", prefix, date.format("%d_%m_%Y"))
}

/// Writes `urls` as a snapshot in `directory`
///
/// Rows are sorted so two exports of the same set are byte-identical. The
/// file is first written to a `.partial` sibling and renamed into place,
/// replacing any snapshot already written the same day.
///
/// # Arguments
///
/// * `urls` - The set to export
/// * `directory` - Directory the snapshot is written to
/// * `prefix` - File name prefix
/// * `date` - Day the snapshot is named after
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written snapshot
/// * `Err(ExportError)` - The file could not be written
pub fn export_snapshot(
    urls: &DiscoveredSet,
    directory: &Path,
    prefix: &str,
    date: NaiveDate,
) -> ExportResult<PathBuf> {
    let path = directory.join(snapshot_file_name(prefix, date));
    let partial = directory.join(format!("{}.partial", snapshot_file_name(prefix, date)));

    let write_err = |source| ExportError::Write {
        path: partial.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(&partial).map_err(write_err)?;
    writer.write_record([SNAPSHOT_HEADER]).map_err(write_err)?;
    for url in urls.to_sorted_vec() {
        writer.write_record([url.as_str()]).map_err(write_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: partial.clone(),
        source,
    })?;
    drop(writer);

    std::fs::rename(&partial, &path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!("Wrote snapshot of {} URLs to {}", urls.len(), path.display());
    Ok(path)
}

/// Reads a snapshot back into a set
pub fn read_snapshot(path: &Path) -> ExportResult<DiscoveredSet> {
    let read_err = |source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut urls = DiscoveredSet::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        if let Some(url) = record.get(0) {
            urls.insert(url);
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    #[test]
    fn test_snapshot_file_name() {
        assert_eq!(
            snapshot_file_name("Apt_active_ids_", date()),
            "Apt_active_ids_07_03_2025.csv"
        );
    }

    #[test]
    fn test_export_layout() {
        let dir = tempfile::tempdir().unwrap();
        let urls: DiscoveredSet = ["https://x/b", "https://x/a"].into_iter().collect();

        let path = export_snapshot(&urls, dir.path(), "ids_", date()).unwrap();
        assert_eq!(path, dir.path().join("ids_07_03_2025.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "0\nhttps://x/a\nhttps://x/b\n");
        assert!(!dir.path().join("ids_07_03_2025.csv.partial").exists());
    }

    #[test]
    fn test_export_then_read_back_yields_same_set() {
        let dir = tempfile::tempdir().unwrap();
        let urls: DiscoveredSet = [
            "https://x/1",
            "https://x/2",
            "https://x/listing?beds=2,baths=1",
        ]
        .into_iter()
        .collect();

        let path = export_snapshot(&urls, dir.path(), "ids_", date()).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), urls);
    }

    #[test]
    fn test_same_day_export_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first: DiscoveredSet = ["https://x/1", "https://x/2"].into_iter().collect();
        let second: DiscoveredSet = ["https://x/3"].into_iter().collect();

        export_snapshot(&first, dir.path(), "ids_", date()).unwrap();
        let path = export_snapshot(&second, dir.path(), "ids_", date()).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), second);
    }

    #[test]
    fn test_empty_set_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_snapshot(&DiscoveredSet::new(), dir.path(), "ids_", date()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0\n");
        assert!(read_snapshot(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = export_snapshot(&DiscoveredSet::new(), &missing, "ids_", date());
        assert!(matches!(result, Err(ExportError::Write { .. })));
    }
}
