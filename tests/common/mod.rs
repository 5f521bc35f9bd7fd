#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{bail, Result};
use async_trait::async_trait;

use docsearch::embedding::Embedder;
use docsearch::progress::{IndexEvent, IndexReporter};
use docsearch::store::{
    CollectionLookup, DistanceMetric, QueryMatch, StoredEntry, VectorRecord, VectorStore,
};

pub const DIMS: usize = 256;

/// Deterministic bag-of-words embedder: each lowercase word bumps one
/// hashed bucket, then the vector is L2-normalized.
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-bow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIMS];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % DIMS as u64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }
}

/// Embedder that always fails, standing in for an unreachable backend.
pub struct BrokenEmbedder;

#[async_trait]
impl Embedder for BrokenEmbedder {
    fn model_name(&self) -> &str {
        "broken"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("embedding backend unreachable")
    }
}

/// Captures progress events for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: RefCell<Vec<IndexEvent>>,
}

impl IndexReporter for RecordingReporter {
    fn report(&self, event: IndexEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.render()).collect()
    }
}

/// Store whose lookups always fail, to check failures are not treated as absence.
pub struct UnreachableStore;

#[async_trait]
impl VectorStore for UnreachableStore {
    async fn lookup_collection(&self, _name: &str) -> CollectionLookup {
        CollectionLookup::Failed(anyhow::anyhow!("disk I/O error"))
    }

    async fn create_collection(&self, _name: &str, _metric: DistanceMetric) -> Result<()> {
        bail!("create_collection must not be called after a failed lookup")
    }

    async fn upsert(&self, _collection: &str, _records: &[VectorRecord]) -> Result<()> {
        bail!("unreachable")
    }

    async fn query(&self, _c: &str, _v: &[f32], _k: usize) -> Result<Vec<QueryMatch>> {
        bail!("unreachable")
    }

    async fn get_all(&self, _collection: &str) -> Result<Vec<StoredEntry>> {
        bail!("unreachable")
    }
}

/// Store that answers every query with a fixed, pre-ranked list.
pub struct ScriptedStore {
    pub matches: Vec<QueryMatch>,
}

#[async_trait]
impl VectorStore for ScriptedStore {
    async fn lookup_collection(&self, _name: &str) -> CollectionLookup {
        CollectionLookup::Found(DistanceMetric::Cosine)
    }

    async fn create_collection(&self, _name: &str, _metric: DistanceMetric) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, _collection: &str, _records: &[VectorRecord]) -> Result<()> {
        Ok(())
    }

    async fn query(&self, _c: &str, _v: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        Ok(self.matches.iter().take(k).cloned().collect())
    }

    async fn get_all(&self, _collection: &str) -> Result<Vec<StoredEntry>> {
        Ok(Vec::new())
    }
}

pub fn words(prefix: &str, n: usize) -> String {
    (0..n)
        .map(|i| format!("{}{}", prefix, i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn write_file(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
