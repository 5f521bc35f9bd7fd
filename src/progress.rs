//! Indexing progress reporting.
//!
//! The indexing pipeline emits one [`IndexEvent`] per file and a final
//! summary. [`StdoutReporter`] prints them for the CLI: progress on stdout,
//! per-file failures on stderr. Tests supply their own reporter to capture
//! events.

use std::path::PathBuf;

/// Counts produced by an indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub files_indexed: usize,
    pub chunks_created: usize,
    pub files_failed: usize,
    /// Files refused before reading, e.g. paths that cannot form a chunk id.
    pub files_skipped: usize,
}

/// A single progress event from the indexing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    /// The file's chunks were embedded and written to the store.
    Indexed { path: PathBuf, chunks: usize },
    /// Dry run: the file would produce this many chunks.
    Planned { path: PathBuf, chunks: usize },
    /// The file could not be read or decoded and was skipped.
    Failed { path: PathBuf, error: String },
    /// The file was refused before reading (e.g. its path cannot form a chunk id).
    Skipped { path: PathBuf, reason: String },
    /// The run finished.
    Complete { summary: IndexSummary, dry_run: bool },
}

impl IndexEvent {
    /// The human-readable line for this event.
    pub fn render(&self) -> String {
        match self {
            IndexEvent::Indexed { path, chunks } => {
                format!("Indexed: {} ({} chunks)", path.display(), chunks)
            }
            IndexEvent::Planned { path, chunks } => {
                format!("Would index: {} ({} chunks)", path.display(), chunks)
            }
            IndexEvent::Failed { path, error } => {
                format!("Error indexing {}: {}", path.display(), error)
            }
            IndexEvent::Skipped { path, reason } => {
                format!("Skipping {}: {}", path.display(), reason)
            }
            IndexEvent::Complete { summary, dry_run } => {
                let mut line = format!(
                    "\nIndexing complete{}: {} files, {} chunks",
                    if *dry_run { " (dry-run)" } else { "" },
                    summary.files_indexed,
                    summary.chunks_created
                );
                if summary.files_failed > 0 {
                    line.push_str(&format!(" ({} files failed)", summary.files_failed));
                }
                if summary.files_skipped > 0 {
                    line.push_str(&format!(" ({} files skipped)", summary.files_skipped));
                }
                line
            }
        }
    }
}

/// Receives progress events from the indexing pipeline.
pub trait IndexReporter {
    fn report(&self, event: IndexEvent);
}

/// Prints progress lines for interactive use.
pub struct StdoutReporter;

impl IndexReporter for StdoutReporter {
    fn report(&self, event: IndexEvent) {
        match event {
            IndexEvent::Failed { .. } | IndexEvent::Skipped { .. } => {
                eprintln!("{}", event.render())
            }
            _ => println!("{}", event.render()),
        }
    }
}
