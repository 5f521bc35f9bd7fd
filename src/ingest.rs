//! Indexing pipeline.
//!
//! Coordinates the flow: file selection → read → fingerprint → chunking →
//! embedding → one batched upsert per file. Files are handled one at a time
//! in walk order.
//!
//! A file that cannot be read or is not valid UTF-8 is reported and skipped;
//! that is the only failure the pipeline recovers from. Embedding and store
//! errors abort the run.
//!
//! Re-indexing writes the same `path::index` ids again, so existing entries
//! are overwritten in place. Entries for files that no longer exist on disk
//! are left in the store.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::chunk::chunk_words;
use crate::config::Config;
use crate::embedding::Embedder;
use crate::files::{FileSelector, SelectedFile};
use crate::models::{ChunkId, ChunkMetadata, ID_SEPARATOR};
use crate::progress::{IndexEvent, IndexReporter, IndexSummary};
use crate::store::{Collection, VectorRecord};

/// A file that has been read, fingerprinted, and chunked.
#[derive(Debug, Clone)]
pub struct PreparedFile {
    pub chunks: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
}

impl PreparedFile {
    pub fn ids(&self) -> Vec<String> {
        self.metadata
            .iter()
            .map(|m| ChunkId::new(m.filepath.clone(), m.chunk_index).to_string())
            .collect()
    }
}

pub struct Indexer<'a> {
    config: &'a Config,
    embedder: &'a dyn Embedder,
    collection: &'a Collection,
    reporter: &'a dyn IndexReporter,
}

impl<'a> Indexer<'a> {
    pub fn new(
        config: &'a Config,
        embedder: &'a dyn Embedder,
        collection: &'a Collection,
        reporter: &'a dyn IndexReporter,
    ) -> Self {
        Self {
            config,
            embedder,
            collection,
            reporter,
        }
    }

    /// Index every matching file under `directory`.
    ///
    /// `extensions` restricts the file suffixes; `None` or an empty slice
    /// uses the configured defaults.
    pub async fn index(
        &self,
        directory: &Path,
        extensions: Option<&[String]>,
    ) -> Result<IndexSummary> {
        let selector = selector_for(self.config, directory, extensions);
        let mut summary = IndexSummary::default();
        tracing::info!(
            "indexing {} with embedding model {}",
            directory.display(),
            self.embedder.model_name()
        );

        for file in selector.files() {
            let prepared = match prepare_or_report(self.config, &file, self.reporter) {
                Prepared::Ready(prepared) => prepared,
                Prepared::Skipped => {
                    summary.files_skipped += 1;
                    continue;
                }
                Prepared::Failed => {
                    summary.files_failed += 1;
                    continue;
                }
            };

            let written = self.write_file(&prepared).await.with_context(|| {
                format!("Failed to index {}", file.path.display())
            })?;

            summary.files_indexed += 1;
            summary.chunks_created += written;
            self.reporter.report(IndexEvent::Indexed {
                path: file.path.clone(),
                chunks: written,
            });
        }

        self.reporter.report(IndexEvent::Complete {
            summary,
            dry_run: false,
        });
        Ok(summary)
    }

    async fn write_file(&self, prepared: &PreparedFile) -> Result<usize> {
        let ids = prepared.ids();
        let mut records = Vec::with_capacity(prepared.chunks.len());

        for ((id, chunk), meta) in ids
            .into_iter()
            .zip(prepared.chunks.iter())
            .zip(prepared.metadata.iter())
        {
            let embedding = self.embedder.embed(chunk).await?;
            records.push(VectorRecord {
                id,
                embedding,
                document: chunk.clone(),
                metadata: serde_json::to_value(meta)?,
            });
        }

        self.collection.upsert(&records).await?;
        Ok(records.len())
    }
}

/// Walk and chunk without embedding or touching the store.
pub fn plan(
    config: &Config,
    directory: &Path,
    extensions: Option<&[String]>,
    reporter: &dyn IndexReporter,
) -> IndexSummary {
    let selector = selector_for(config, directory, extensions);
    let mut summary = IndexSummary::default();

    for file in selector.files() {
        match prepare_or_report(config, &file, reporter) {
            Prepared::Ready(prepared) => {
                summary.files_indexed += 1;
                summary.chunks_created += prepared.chunks.len();
                reporter.report(IndexEvent::Planned {
                    path: file.path.clone(),
                    chunks: prepared.chunks.len(),
                });
            }
            Prepared::Skipped => summary.files_skipped += 1,
            Prepared::Failed => summary.files_failed += 1,
        }
    }

    reporter.report(IndexEvent::Complete {
        summary,
        dry_run: true,
    });
    summary
}

fn selector_for(config: &Config, directory: &Path, extensions: Option<&[String]>) -> FileSelector {
    let extensions = config.extensions_or_default(extensions);
    FileSelector::new(directory, &extensions, &config.excluded_dirs)
}

enum Prepared {
    Ready(PreparedFile),
    /// Refused before reading; not counted as a failure.
    Skipped,
    Failed,
}

fn prepare_or_report(
    config: &Config,
    file: &SelectedFile,
    reporter: &dyn IndexReporter,
) -> Prepared {
    let filepath = file.path.to_string_lossy();
    if filepath.contains(ID_SEPARATOR) {
        reporter.report(IndexEvent::Skipped {
            path: file.path.clone(),
            reason: format!("path contains the id separator '{}'", ID_SEPARATOR),
        });
        return Prepared::Skipped;
    }

    match read_document(&file.path) {
        Ok((bytes, text)) => {
            let indexed_at = chrono::Utc::now().to_rfc3339();
            Prepared::Ready(prepare_file(config, file, &bytes, &text, &indexed_at))
        }
        Err(e) => {
            tracing::debug!("read failed for {}: {:#}", file.path.display(), e);
            reporter.report(IndexEvent::Failed {
                path: file.path.clone(),
                error: e.to_string(),
            });
            Prepared::Failed
        }
    }
}

/// Read a file as raw bytes and decode it as UTF-8.
pub fn read_document(path: &Path) -> Result<(Vec<u8>, String)> {
    let bytes = std::fs::read(path)?;
    let text = std::str::from_utf8(&bytes)?.to_string();
    Ok((bytes, text))
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn file_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Chunk a decoded file and build one metadata record per chunk.
pub fn prepare_file(
    config: &Config,
    file: &SelectedFile,
    bytes: &[u8],
    text: &str,
    indexed_at: &str,
) -> PreparedFile {
    let chunks = chunk_words(text, config.chunk_size, config.overlap_ratio);
    let filepath = file.path.to_string_lossy().to_string();
    let filename = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let hash = file_hash(bytes);
    let total_chunks = chunks.len();

    let metadata = (0..total_chunks)
        .map(|chunk_index| ChunkMetadata {
            filepath: filepath.clone(),
            filename: filename.clone(),
            extension: file.extension.clone(),
            chunk_index,
            total_chunks,
            file_hash: hash.clone(),
            indexed_at: indexed_at.to_string(),
        })
        .collect();

    PreparedFile { chunks, metadata }
}
