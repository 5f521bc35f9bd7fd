//! Human-readable formatting for search results and index statistics.
//!
//! Pure functions: the same input always yields the same text.

use std::fmt::Write;

use crate::models::{SearchResult, Stats};

/// Format ranked results for `query`, or a "no results" line.
pub fn format_results(results: &[SearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found for: '{}'\n", query);
    }

    let mut out = String::new();
    let _ = writeln!(out, "\nFound {} results for: '{}'\n", results.len(), query);

    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (chunk {}, score: {:.3})",
            i + 1,
            result.filepath,
            result.chunk_index,
            result.score
        );
        let _ = writeln!(out, "   {}\n", result.content);
    }

    out
}

/// Format index statistics.
pub fn format_stats(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nIndex Statistics:");
    let _ = writeln!(out, "  Location: {}", stats.index_location);
    let _ = writeln!(out, "  Size: {}", format_bytes(stats.index_bytes));
    let _ = writeln!(out, "  Total files: {}", stats.total_files);
    let _ = writeln!(out, "  Total chunks: {}", stats.total_chunks);
    out
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
