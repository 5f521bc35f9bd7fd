//! SQLite-backed [`VectorStore`].
//!
//! Each index directory holds one `index.sqlite` file with two tables:
//! `collections` (name, metric) and `entries` (vector BLOB, document text,
//! metadata JSON, keyed by `(collection, id)`). Nearest-neighbour queries
//! load the collection's vectors and rank them in Rust.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::{
    blob_to_vec, rank_by_distance, vec_to_blob, CollectionLookup, DistanceMetric, QueryMatch,
    StoredEntry, VectorRecord, VectorStore,
};
use crate::config::index_db_path;
use crate::{db, migrate};

pub struct SqliteVectorStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteVectorStore {
    /// Open the store in `index_dir`, creating the directory, database
    /// file, and schema if they do not exist yet.
    pub async fn open(index_dir: &Path) -> Result<Self> {
        let db_path = index_db_path(index_dir);
        let pool = db::connect(&db_path).await?;
        migrate::run_migrations(&pool)
            .await
            .with_context(|| format!("Failed to initialize index schema: {}", db_path.display()))?;
        Ok(Self { pool, db_path })
    }

    /// Open an existing index in `index_dir` for reading only.
    ///
    /// Fails if the database file does not exist; never runs migrations.
    pub async fn open_read_only(index_dir: &Path) -> Result<Self> {
        let db_path = index_db_path(index_dir);
        let pool = db::connect_read_only(&db_path).await?;
        Ok(Self { pool, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn metric_of(&self, collection: &str) -> Result<DistanceMetric> {
        let metric: Option<String> =
            sqlx::query_scalar("SELECT metric FROM collections WHERE name = ?")
                .bind(collection)
                .fetch_optional(&self.pool)
                .await?;
        metric
            .ok_or_else(|| anyhow::anyhow!("Collection not found: {}", collection))?
            .parse()
    }
}

fn parse_metadata(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({}))
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn lookup_collection(&self, name: &str) -> CollectionLookup {
        let row: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT metric FROM collections WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await;

        match row {
            Ok(Some(metric)) => match metric.parse() {
                Ok(metric) => CollectionLookup::Found(metric),
                Err(e) => CollectionLookup::Failed(e),
            },
            Ok(None) => CollectionLookup::NotFound,
            Err(e) => CollectionLookup::Failed(e.into()),
        }
    }

    async fn create_collection(&self, name: &str, metric: DistanceMetric) -> Result<()> {
        sqlx::query("INSERT INTO collections (name, metric, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(metric.as_str())
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create collection '{}'", name))?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO entries (collection, id, embedding, dims, document, metadata_json)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    embedding = excluded.embedding,
                    dims = excluded.dims,
                    document = excluded.document,
                    metadata_json = excluded.metadata_json
                "#,
            )
            .bind(collection)
            .bind(&record.id)
            .bind(vec_to_blob(&record.embedding))
            .bind(record.embedding.len() as i64)
            .bind(&record.document)
            .bind(record.metadata.to_string())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert entry '{}'", record.id))?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        let metric = self.metric_of(collection).await?;

        let rows = sqlx::query(
            "SELECT id, embedding, document, metadata_json FROM entries WHERE collection = ?",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let candidates = rows.iter().map(|row| {
            let blob: Vec<u8> = row.get("embedding");
            let metadata: String = row.get("metadata_json");
            (
                row.get::<String, _>("id"),
                blob_to_vec(&blob),
                row.get::<String, _>("document"),
                parse_metadata(&metadata),
            )
        });

        rank_by_distance(metric, vector, candidates, k)
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<StoredEntry>> {
        // Surface a missing collection as an error rather than an empty scan.
        self.metric_of(collection).await?;

        let rows = sqlx::query(
            "SELECT id, document, metadata_json FROM entries WHERE collection = ? ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let metadata: String = row.get("metadata_json");
                StoredEntry {
                    id: row.get("id"),
                    document: row.get("document"),
                    metadata: parse_metadata(&metadata),
                }
            })
            .collect())
    }
}
