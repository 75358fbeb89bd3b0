//! Human-readable run summary

use crate::pipeline::SyncSummary;

/// Formats a run summary as plain text
pub fn format_summary(summary: &SyncSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Sitemap Sync Summary ===\n\n");
    out.push_str(&format!("Root sitemap: {}\n", summary.root_url));
    out.push_str(&format!(
        "Duration: {:.1}s\n\n",
        summary.elapsed.as_secs_f64()
    ));

    out.push_str("Resolve:\n");
    out.push_str(&format!("  URLs discovered: {}\n", summary.urls));
    out.push_str(&format!(
        "  Sitemaps loaded: {} ({} index, {} URL set)\n",
        summary.report.nodes_loaded, summary.report.index_nodes, summary.report.urlset_nodes
    ));
    out.push_str(&format!(
        "  Warnings: {} ({} failed sitemaps)\n",
        summary.report.warning_count(),
        summary.report.failed_nodes()
    ));
    for warning in &summary.report.warnings {
        out.push_str(&format!("    - {}\n", warning));
    }

    out.push_str(&format!("\nSnapshot: {}\n", summary.snapshot.display()));

    match &summary.replace {
        Some(replace) => {
            out.push_str("\nReplace:\n");
            out.push_str(&format!(
                "  Table: {} ({} strategy)\n",
                replace.table, replace.strategy
            ));
            out.push_str(&format!(
                "  Rows: {} in {} batches, {} commits\n",
                replace.rows,
                replace.batches,
                replace.commit_sizes.len()
            ));
        }
        None => out.push_str("\nReplace: skipped\n"),
    }

    out
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &SyncSummary) {
    print!("{}", format_summary(summary));
}
