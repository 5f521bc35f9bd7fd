//! In-memory [`VectorStore`] for tests.
//!
//! Collections live in a `BTreeMap` behind `std::sync::RwLock`; queries are
//! a brute-force scan, the same as the SQLite backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use super::{
    rank_by_distance, CollectionLookup, DistanceMetric, QueryMatch, StoredEntry, VectorRecord,
    VectorStore,
};

struct MemCollection {
    metric: DistanceMetric,
    entries: BTreeMap<String, VectorRecord>,
}

#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, MemCollection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn lookup_collection(&self, name: &str) -> CollectionLookup {
        match self.collections.read() {
            Ok(map) => match map.get(name) {
                Some(c) => CollectionLookup::Found(c.metric),
                None => CollectionLookup::NotFound,
            },
            Err(_) => CollectionLookup::Failed(poisoned()),
        }
    }

    async fn create_collection(&self, name: &str, metric: DistanceMetric) -> Result<()> {
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        if map.contains_key(name) {
            bail!("Collection already exists: {}", name);
        }
        map.insert(
            name.to_string(),
            MemCollection {
                metric,
                entries: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let coll = map
            .get_mut(collection)
            .ok_or_else(|| anyhow!("Collection not found: {}", collection))?;
        for record in records {
            coll.entries.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        let map = self.collections.read().map_err(|_| poisoned())?;
        let coll = map
            .get(collection)
            .ok_or_else(|| anyhow!("Collection not found: {}", collection))?;
        let candidates = coll.entries.values().map(|r| {
            (
                r.id.clone(),
                r.embedding.clone(),
                r.document.clone(),
                r.metadata.clone(),
            )
        });
        rank_by_distance(coll.metric, vector, candidates, k)
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<StoredEntry>> {
        let map = self.collections.read().map_err(|_| poisoned())?;
        let coll = map
            .get(collection)
            .ok_or_else(|| anyhow!("Collection not found: {}", collection))?;
        Ok(coll
            .entries
            .values()
            .map(|r| StoredEntry {
                id: r.id.clone(),
                document: r.document.clone(),
                metadata: r.metadata.clone(),
            })
            .collect())
    }
}
