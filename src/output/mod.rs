//! Output module for run artifacts and reports
//!
//! This module handles:
//! - Writing dated CSV snapshots of the discovered URL set
//! - Reading snapshots back for verification
//! - Formatting the end-of-run summary

mod snapshot;
mod summary;

pub use snapshot::{
    export_snapshot, read_snapshot, snapshot_file_name, ExportError, ExportResult, SNAPSHOT_HEADER,
};
pub use summary::{format_summary, print_summary};
