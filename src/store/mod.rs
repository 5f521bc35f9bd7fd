//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the capability the pipelines need from a
//! persistent similarity index: named collections supporting upsert by id,
//! nearest-neighbour query with metadata payloads, and a full scan.
//! [`Collection`] binds a store to one collection and is what the indexing,
//! query, and stats code actually hold.
//!
//! Implementations:
//! - [`sqlite::SqliteVectorStore`]: persistent, one SQLite file per index directory.
//! - [`memory::InMemoryStore`]: process-local, used in tests.

pub mod memory;
pub mod sqlite;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Distance function a collection is created with.
///
/// Stored by name in the index so a collection written with an unknown
/// metric is rejected on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// `1 - cos(a, b)`; ranges over `[0, 2]`.
    Cosine,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
        }
    }

    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b) as f64,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(DistanceMetric::Cosine),
            other => bail!("Unknown distance metric: {}", other),
        }
    }
}

/// One entry to write: id, vector, document text, and metadata payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: serde_json::Value,
}

/// A nearest-neighbour hit. Lower `distance` is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub distance: f64,
    pub document: String,
    pub metadata: serde_json::Value,
}

/// A stored entry as returned by a full scan (vector omitted).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: String,
    pub document: String,
    pub metadata: serde_json::Value,
}

/// Outcome of probing for a collection.
///
/// Absence and failure are kept apart so a broken store is not mistaken
/// for an empty one.
#[derive(Debug)]
pub enum CollectionLookup {
    Found(DistanceMetric),
    NotFound,
    Failed(anyhow::Error),
}

/// Persistent similarity index with named collections.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`lookup_collection`](VectorStore::lookup_collection) | Probe whether a collection exists |
/// | [`create_collection`](VectorStore::create_collection) | Create an empty collection |
/// | [`upsert`](VectorStore::upsert) | Insert or overwrite entries by id |
/// | [`query`](VectorStore::query) | `k` nearest entries, closest first |
/// | [`get_all`](VectorStore::get_all) | Every entry in the collection |
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn lookup_collection(&self, name: &str) -> CollectionLookup;

    async fn create_collection(&self, name: &str, metric: DistanceMetric) -> Result<()>;

    /// Write all records; an existing id is overwritten, never duplicated.
    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()>;

    /// Return up to `k` entries ordered by ascending distance to `vector`.
    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>>;

    async fn get_all(&self, collection: &str) -> Result<Vec<StoredEntry>>;
}

/// Whether [`Collection::open_or_create`] found or created the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Existing,
    Created,
}

/// A store handle bound to one collection.
#[derive(Clone)]
pub struct Collection {
    store: Arc<dyn VectorStore>,
    name: String,
}

impl Collection {
    /// Open `name`, creating it with the cosine metric if it does not exist.
    ///
    /// A lookup that fails for any reason other than absence is returned
    /// as an error.
    pub async fn open_or_create(
        store: Arc<dyn VectorStore>,
        name: &str,
    ) -> Result<(Self, OpenOutcome)> {
        let outcome = match store.lookup_collection(name).await {
            CollectionLookup::Found(_) => OpenOutcome::Existing,
            CollectionLookup::NotFound => {
                store.create_collection(name, DistanceMetric::Cosine).await?;
                OpenOutcome::Created
            }
            CollectionLookup::Failed(e) => {
                return Err(e.context(format!("Failed to open collection '{}'", name)))
            }
        };

        let collection = Self {
            store,
            name: name.to_string(),
        };
        Ok((collection, outcome))
    }

    /// Open `name` only if it already exists.
    pub async fn open_existing(store: Arc<dyn VectorStore>, name: &str) -> Result<Option<Self>> {
        match store.lookup_collection(name).await {
            CollectionLookup::Found(_) => Ok(Some(Self {
                store,
                name: name.to_string(),
            })),
            CollectionLookup::NotFound => Ok(None),
            CollectionLookup::Failed(e) => Err(e),
        }
    }

    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.store.upsert(&self.name, records).await
    }

    pub async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        self.store.query(&self.name, vector, k).await
    }

    pub async fn get_all(&self) -> Result<Vec<StoredEntry>> {
        self.store.get_all(&self.name).await
    }
}

/// Rank `candidates` by distance to `query` and keep the closest `k`.
///
/// Shared by the store implementations, which all scan exhaustively.
pub(crate) fn rank_by_distance<I>(
    metric: DistanceMetric,
    query: &[f32],
    candidates: I,
    k: usize,
) -> Result<Vec<QueryMatch>>
where
    I: IntoIterator<Item = (String, Vec<f32>, String, serde_json::Value)>,
{
    let mut matches = Vec::new();
    for (id, vector, document, metadata) in candidates {
        if vector.len() != query.len() {
            return Err(anyhow!(
                "Embedding dimension mismatch for '{}': stored {}, query {}",
                id,
                vector.len(),
                query.len()
            ));
        }
        matches.push(QueryMatch {
            distance: metric.distance(query, &vector),
            id,
            document,
            metadata,
        });
    }

    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    matches.truncate(k);
    Ok(matches)
}

/// Encode a float vector as little-endian f32 bytes.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian f32 bytes written by [`vec_to_blob`].
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity in `[-1.0, 1.0]`; `0.0` for empty, mismatched, or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_blob_roundtrip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        assert_eq!(blob_to_vec(&vec_to_blob(&vec)), vec);
    }

    #[test]
    fn test_cosine_distance() {
        let m = DistanceMetric::Cosine;
        assert!(m.distance(&[1.0, 2.0], &[2.0, 4.0]).abs() < 1e-6);
        assert!((m.distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((m.distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert!("l2".parse::<DistanceMetric>().is_err());
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_rank_by_distance_orders_and_truncates() {
        let candidates = vec![
            ("far".to_string(), vec![-1.0, 0.0], String::new(), serde_json::json!({})),
            ("near".to_string(), vec![1.0, 0.1], String::new(), serde_json::json!({})),
            ("mid".to_string(), vec![0.0, 1.0], String::new(), serde_json::json!({})),
        ];
        let ranked = rank_by_distance(DistanceMetric::Cosine, &[1.0, 0.0], candidates, 2).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(ranked[0].distance <= ranked[1].distance);
    }

    #[test]
    fn test_rank_by_distance_dimension_mismatch() {
        let candidates = vec![("a".to_string(), vec![1.0], String::new(), serde_json::json!({}))];
        assert!(rank_by_distance(DistanceMetric::Cosine, &[1.0, 0.0], candidates, 5).is_err());
    }
}
