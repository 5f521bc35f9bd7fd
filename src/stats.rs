//! Index statistics.
//!
//! Scans every stored entry and counts distinct source files and total
//! chunks. Any failure along the way yields a zeroed [`Stats`] record, and
//! nothing is created on disk when the index does not exist yet.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use walkdir::WalkDir;

use crate::config::index_db_path;
use crate::models::{ChunkId, Stats};
use crate::store::sqlite::SqliteVectorStore;
use crate::store::{Collection, StoredEntry, VectorStore};

/// Stats for the collection `name` in `store`; zeroed on any failure.
pub async fn collect_stats(
    store: Arc<dyn VectorStore>,
    name: &str,
    index_location: &Path,
) -> Stats {
    match try_collect(store, name).await {
        Ok(Some((total_files, total_chunks))) => Stats {
            total_files,
            total_chunks,
            index_location: index_location.display().to_string(),
            index_bytes: dir_size(index_location),
        },
        Ok(None) => Stats::empty(index_location.display().to_string()),
        Err(e) => {
            tracing::debug!("stats unavailable: {:#}", e);
            Stats::empty(index_location.display().to_string())
        }
    }
}

async fn try_collect(store: Arc<dyn VectorStore>, name: &str) -> Result<Option<(usize, usize)>> {
    let Some(collection) = Collection::open_existing(store, name).await? else {
        return Ok(None);
    };
    let entries = collection.get_all().await?;
    Ok(Some((count_files(&entries), entries.len())))
}

/// Stats for the on-disk index at `index_dir`, without creating it.
pub async fn index_stats(index_dir: &Path, name: &str) -> Stats {
    if !index_db_path(index_dir).exists() {
        return Stats::empty(index_dir.display().to_string());
    }

    let store = match SqliteVectorStore::open_read_only(index_dir).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::debug!("stats unavailable: {:#}", e);
            return Stats::empty(index_dir.display().to_string());
        }
    };

    let stats = collect_stats(store.clone(), name, index_dir).await;
    store.close().await;
    stats
}

/// Number of distinct source files among `entries`.
///
/// Uses the `filepath` metadata field, falling back to the path encoded
/// in the entry id.
pub fn count_files(entries: &[StoredEntry]) -> usize {
    entries
        .iter()
        .map(|e| {
            e.metadata
                .get("filepath")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .or_else(|| ChunkId::parse(&e.id).ok().map(|id| id.filepath))
                .unwrap_or_else(|| e.id.clone())
        })
        .collect::<HashSet<_>>()
        .len()
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::{DistanceMetric, VectorRecord};
    use serde_json::json;
    use tempfile::TempDir;

    fn entry(id: &str, metadata: serde_json::Value) -> StoredEntry {
        StoredEntry {
            id: id.to_string(),
            document: String::new(),
            metadata,
        }
    }

    #[test]
    fn test_count_files() {
        let entries = vec![
            entry("a.md::0", json!({ "filepath": "a.md" })),
            entry("a.md::1", json!({ "filepath": "a.md" })),
            entry("b.md::0", json!({})),
            entry("b.md::1", json!({})),
            entry("c.md::0", json!({ "filepath": "c.md" })),
        ];
        assert_eq!(count_files(&entries), 3);
        assert_eq!(count_files(&[]), 0);
    }

    #[tokio::test]
    async fn test_missing_collection_is_zero() {
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryStore::new());
        let stats = collect_stats(store, "docs", Path::new("idx")).await;
        assert_eq!(stats, Stats::empty("idx"));
    }

    #[tokio::test]
    async fn test_counts_from_store() {
        let store = Arc::new(InMemoryStore::new());
        store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();
        let records: Vec<VectorRecord> = ["a.md::0", "a.md::1", "b.txt::0"]
            .iter()
            .map(|id| VectorRecord {
                id: id.to_string(),
                embedding: vec![1.0],
                document: String::new(),
                metadata: json!({ "filepath": ChunkId::parse(id).unwrap().filepath }),
            })
            .collect();
        store.upsert("docs", &records).await.unwrap();

        let stats = collect_stats(store, "docs", Path::new("idx")).await;
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.index_location, "idx");
    }

    #[tokio::test]
    async fn test_index_stats_does_not_create_index() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".semantic_index");
        let stats = index_stats(&dir, "docs").await;
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_chunks, 0);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_index_stats_does_not_migrate_existing_file() {
        let tmp = TempDir::new().unwrap();
        let db = index_db_path(tmp.path());
        std::fs::write(&db, b"").unwrap();

        let stats = index_stats(tmp.path(), "docs").await;
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(std::fs::metadata(&db).unwrap().len(), 0);
    }
}
