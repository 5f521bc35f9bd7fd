//! Embedding provider abstraction and implementations.
//!
//! Defines the [`Embedder`] trait and two backends:
//! - **[`LocalEmbedder`]**: runs a sentence-embedding model in-process via
//!   fastembed. The model is downloaded and loaded on first use, then kept
//!   for the lifetime of the embedder.
//! - **[`OllamaEmbedder`]**: calls a running Ollama server's `/api/embed`.
//!
//! Use [`create_embedder`] to build the backend named in the config.
//! Neither backend retries: a failed call is returned to the caller.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Model used by the local backend when none is configured.
pub const DEFAULT_LOCAL_MODEL: &str = "all-minilm-l6-v2";

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic for identical input and free of
/// side effects visible to the caller.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Create the [`Embedder`] selected by `config.provider`.
///
/// | Config Value | Backend |
/// |-------------|---------|
/// | `"local"` | [`LocalEmbedder`] (requires the `local-embeddings-fastembed` feature) |
/// | `"ollama"` | [`OllamaEmbedder`] |
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    match config.provider.as_str() {
        #[cfg(feature = "local-embeddings-fastembed")]
        "local" => Ok(Box::new(LocalEmbedder::new(config)?)),
        #[cfg(not(feature = "local-embeddings-fastembed"))]
        "local" => bail!("Local embedding provider requires --features local-embeddings-fastembed"),
        "ollama" => Ok(Box::new(OllamaEmbedder::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

// ============ Local Provider (fastembed) ============

#[cfg(feature = "local-embeddings-fastembed")]
pub use local::LocalEmbedder;

#[cfg(feature = "local-embeddings-fastembed")]
mod local {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::OnceCell;

    /// In-process embedding via fastembed (ONNX Runtime bundled).
    pub struct LocalEmbedder {
        model_name: String,
        model: fastembed::EmbeddingModel,
        engine: OnceCell<Arc<Mutex<fastembed::TextEmbedding>>>,
    }

    impl LocalEmbedder {
        pub fn new(config: &EmbeddingConfig) -> Result<Self> {
            let model_name = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());
            let model = config_to_fastembed_model(&model_name)?;

            Ok(Self {
                model_name,
                model,
                engine: OnceCell::new(),
            })
        }

        async fn engine(&self) -> Result<Arc<Mutex<fastembed::TextEmbedding>>> {
            let engine = self
                .engine
                .get_or_try_init(|| async {
                    let model = self.model.clone();
                    tracing::info!("loading embedding model {}", self.model_name);
                    let engine = tokio::task::spawn_blocking(move || {
                        fastembed::TextEmbedding::try_new(
                            fastembed::InitOptions::new(model).with_show_download_progress(true),
                        )
                        .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))
                    })
                    .await??;
                    Ok::<_, anyhow::Error>(Arc::new(Mutex::new(engine)))
                })
                .await?;
            Ok(Arc::clone(engine))
        }
    }

    #[async_trait]
    impl Embedder for LocalEmbedder {
        fn model_name(&self) -> &str {
            &self.model_name
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let engine = self.engine().await?;
            let text = text.to_string();

            let mut vectors = tokio::task::spawn_blocking(move || {
                let mut engine = engine
                    .lock()
                    .map_err(|_| anyhow!("embedding model lock poisoned"))?;
                engine
                    .embed(vec![text], None)
                    .map_err(|e| anyhow!("Local embedding failed: {}", e))
            })
            .await??;

            vectors
                .pop()
                .ok_or_else(|| anyhow!("Empty embedding response"))
        }
    }

    fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
        match name {
            "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
            "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
            "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
            other => bail!(
                "Unknown local embedding model: '{}'. Supported models: \
                 all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, nomic-embed-text-v1.5",
                other
            ),
        }
    }

}

// ============ Ollama Provider ============

/// Embedding backend using a local Ollama instance.
///
/// Calls `POST {url}/api/embed` (default `http://localhost:11434`).
/// Requires Ollama to be running with the model pulled.
pub struct OllamaEmbedder {
    model: String,
    url: String,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { model, url, client })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let response = self
            .client
            .post(format!("{}/api/embed", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "Ollama connection error (is Ollama running at {}?): {}",
                    self.url,
                    e
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Ollama API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_ollama_response(&json)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }
}

fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing embeddings array"))?;

    let mut result = Vec::with_capacity(embeddings.len());

    for embedding in embeddings {
        let vec: Vec<f32> = embedding
            .as_array()
            .ok_or_else(|| anyhow!("Invalid Ollama response: embedding is not an array"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        result.push(vec);
    }

    Ok(result)
}
