//! # docsearch
//!
//! Semantic search over local documentation.
//!
//! Files are split into overlapping word chunks, each chunk is embedded
//! into a vector, and the vectors are kept in a persistent index on disk.
//! Natural-language queries are embedded the same way and answered by
//! nearest-neighbour lookup.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌─────────────┐
//! │   files    │──▶│  chunk   │──▶│ embedding│──▶│    store    │
//! │ walk+filter│   │ windows  │   │ Embedder │   │ VectorStore │
//! └────────────┘   └──────────┘   └──────────┘   └──────┬──────┘
//!                                                       │
//!                                 ┌─────────────────────┤
//!                                 ▼                     ▼
//!                           ┌──────────┐          ┌──────────┐
//!                           │  search  │          │  stats   │
//!                           └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docsearch index docs --extensions .md .txt
//! docsearch search "installation steps" -n 3
//! docsearch stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | JSON configuration with built-in defaults |
//! | [`files`] | Directory walk, extension and exclusion filters |
//! | [`chunk`] | Overlapping word-window chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`store`] | Vector store abstraction and backends |
//! | [`ingest`] | Indexing pipeline |
//! | [`search`] | Query pipeline |
//! | [`stats`] | Index statistics |
//! | [`report`] | Result and stats formatting |
//! | [`progress`] | Indexing progress events |

pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod files;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod report;
pub mod search;
pub mod stats;
pub mod store;
