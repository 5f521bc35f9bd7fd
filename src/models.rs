//! Core data models.
//!
//! These types describe what flows through the indexing and query
//! pipelines: the composite chunk id, the metadata stored alongside each
//! vector, and the transient search/stats records shown to the user.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the file path and chunk index in a [`ChunkId`].
pub const ID_SEPARATOR: &str = "::";

/// Maximum number of characters kept in a [`SearchResult`] preview.
pub const PREVIEW_CHARS: usize = 200;

/// Identity of a stored chunk: `"{filepath}::{chunk_index}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId {
    pub filepath: String,
    pub chunk_index: usize,
}

impl ChunkId {
    pub fn new(filepath: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            filepath: filepath.into(),
            chunk_index,
        }
    }

    /// Split a stored id on its last `::` back into path and index.
    pub fn parse(id: &str) -> Result<Self> {
        let (filepath, index) = id
            .rsplit_once(ID_SEPARATOR)
            .ok_or_else(|| anyhow!("chunk id has no '{}' separator: {}", ID_SEPARATOR, id))?;
        let chunk_index = index
            .parse::<usize>()
            .with_context(|| format!("invalid chunk index in id: {}", id))?;
        Ok(Self::new(filepath, chunk_index))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.filepath, ID_SEPARATOR, self.chunk_index)
    }
}

/// Provenance stored with every chunk vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub filepath: String,
    pub filename: String,
    pub extension: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// SHA-256 of the raw file bytes. Recorded only; not compared on re-index.
    pub file_hash: String,
    /// RFC 3339 timestamp of the indexing run that wrote this chunk.
    pub indexed_at: String,
}

/// One ranked match returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub filepath: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub content: String,
    pub score: f64,
}

/// Aggregate counts over the whole index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_files: usize,
    pub total_chunks: usize,
    pub index_location: String,
    pub index_bytes: u64,
}

impl Stats {
    pub fn empty(index_location: impl Into<String>) -> Self {
        Self {
            total_files: 0,
            total_chunks: 0,
            index_location: index_location.into(),
            index_bytes: 0,
        }
    }
}

/// Truncate to [`PREVIEW_CHARS`] characters, appending `...` when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_display_and_parse() {
        let id = ChunkId::new("docs/guide.md", 3);
        assert_eq!(id.to_string(), "docs/guide.md::3");
        assert_eq!(ChunkId::parse("docs/guide.md::3").unwrap(), id);
    }

    #[test]
    fn test_chunk_id_parse_uses_last_separator() {
        let id = ChunkId::parse("C:/odd::dir/file.md::12").unwrap();
        assert_eq!(id.filepath, "C:/odd::dir/file.md");
        assert_eq!(id.chunk_index, 12);
    }

    #[test]
    fn test_chunk_id_parse_errors() {
        assert!(ChunkId::parse("no-separator").is_err());
        assert!(ChunkId::parse("file.md::x").is_err());
        assert!(ChunkId::parse("file.md::-1").is_err());
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("short"), "short");
        let exact = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let long = "b".repeat(PREVIEW_CHARS + 50);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let long = "é".repeat(PREVIEW_CHARS + 1);
        let p = preview(&long);
        assert_eq!(p, format!("{}...", "é".repeat(PREVIEW_CHARS)));
    }

    #[test]
    fn test_metadata_json_shape() {
        let meta = ChunkMetadata {
            filepath: "a/b.md".to_string(),
            filename: "b.md".to_string(),
            extension: ".md".to_string(),
            chunk_index: 0,
            total_chunks: 2,
            file_hash: "abc".to_string(),
            indexed_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["filepath"], "a/b.md");
        assert_eq!(value["total_chunks"], 2);
        let back: ChunkMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }
}
