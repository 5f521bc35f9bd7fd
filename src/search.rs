//! Query pipeline.
//!
//! Embeds the query text, asks the collection for its `k` nearest chunks,
//! and turns each match into a [`SearchResult`]. The store's ranking is
//! kept as-is; the score is `1 - distance`.

use anyhow::{Context, Result};

use crate::embedding::Embedder;
use crate::models::{preview, ChunkId, SearchResult};
use crate::store::{Collection, QueryMatch};

pub struct Searcher<'a> {
    embedder: &'a dyn Embedder,
    collection: &'a Collection,
}

impl<'a> Searcher<'a> {
    pub fn new(embedder: &'a dyn Embedder, collection: &'a Collection) -> Self {
        Self {
            embedder,
            collection,
        }
    }

    /// Return up to `k` results, most similar first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self
            .embedder
            .embed(query)
            .await
            .with_context(|| format!("Failed to embed query with {}", self.embedder.model_name()))?;

        let matches = self.collection.query(&query_vec, k).await?;

        matches.into_iter().map(to_search_result).collect()
    }
}

/// Project a raw store match into a display record.
pub fn to_search_result(m: QueryMatch) -> Result<SearchResult> {
    let id = ChunkId::parse(&m.id)?;
    let total_chunks = m
        .metadata
        .get("total_chunks")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as usize;

    Ok(SearchResult {
        filepath: id.filepath,
        chunk_index: id.chunk_index,
        total_chunks,
        content: preview(&m.document),
        score: 1.0 - m.distance,
    })
}
