//! Configuration loading.
//!
//! The config file is an optional JSON object. Every key is optional and
//! overrides the matching built-in default; keys that are absent keep their
//! default and unknown keys are ignored. A missing, unreadable, malformed,
//! or invalid file yields [`Config::default`] without surfacing an error.
//!
//! ```json
//! {
//!   "excluded_dirs": ["target", "node_modules"],
//!   "chunk_size": 500,
//!   "overlap_ratio": 0.2,
//!   "default_extensions": [".md", ".txt"],
//!   "embedding": { "provider": "ollama", "model": "nomic-embed-text" }
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "tools/semantic_search_config.json";

/// Default location of the persistent index directory.
pub const DEFAULT_INDEX_DIR: &str = "tools/.semantic_index";

/// Name of the single collection the tool reads and writes.
pub const COLLECTION_NAME: &str = "docs";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub excluded_dirs: Vec<String>,
    pub chunk_size: usize,
    pub overlap_ratio: f64,
    pub default_extensions: Vec<String>,
    pub embedding: EmbeddingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            chunk_size: 1000,
            overlap_ratio: 0.25,
            default_extensions: default_extensions(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

fn default_excluded_dirs() -> Vec<String> {
    [
        "target",
        "build",
        "dist",
        "node_modules",
        "vendor",
        "__pycache__",
        "venv",
        ".venv",
        ".git",
        ".hg",
        ".svn",
        ".semantic_index",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extensions() -> Vec<String> {
    [".md", ".txt", ".rs", ".toml", ".log"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Embedding backend selection.
///
/// | `provider` | Backend |
/// |------------|---------|
/// | `"local"`  | fastembed, in-process (default) |
/// | `"ollama"` | `POST {url}/api/embed` on an Ollama server |
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            model: None,
            url: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load the config at `path`, falling back to defaults on any failure.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config ({:#})", e);
                Self::default()
            }
        }
    }

    /// Strict variant of [`Config::load`] that reports why a file was rejected.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk_size must be > 0");
        }
        if !(0.0..1.0).contains(&self.overlap_ratio) {
            bail!("overlap_ratio must be in [0.0, 1.0)");
        }
        match self.embedding.provider.as_str() {
            "local" | "ollama" => {}
            other => bail!(
                "Unknown embedding provider: '{}'. Must be local or ollama.",
                other
            ),
        }
        Ok(())
    }

    /// Extensions to index: the explicit list if one was given, else the defaults.
    pub fn extensions_or_default(&self, requested: Option<&[String]>) -> Vec<String> {
        match requested {
            Some(exts) if !exts.is_empty() => exts.to_vec(),
            _ => self.default_extensions.clone(),
        }
    }
}

/// Location of the SQLite file inside an index directory.
pub fn index_db_path(index_dir: &Path) -> PathBuf {
    index_dir.join("index.sqlite")
}
