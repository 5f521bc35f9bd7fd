//! # docsearch CLI
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docsearch index [DIR]` | Chunk, embed, and store every matching file under `DIR` |
//! | `docsearch search "<query>"` | Show the chunks most similar to the query |
//! | `docsearch stats` | Show index location, file count, and chunk count |
//!
//! Diagnostics go to stderr and are controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=docsearch=debug`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use docsearch::config::{self, Config};
use docsearch::embedding;
use docsearch::ingest::{self, Indexer};
use docsearch::progress::StdoutReporter;
use docsearch::report;
use docsearch::search::Searcher;
use docsearch::stats;
use docsearch::store::sqlite::SqliteVectorStore;
use docsearch::store::{Collection, OpenOutcome, VectorStore};

/// Semantic search for documentation.
///
/// Indexes text files into a local vector index and answers
/// natural-language queries by similarity instead of exact match.
#[derive(Parser)]
#[command(name = "docsearch", version, about = "Semantic search for documentation")]
struct Cli {
    /// Path to the JSON configuration file. A missing or invalid file
    /// means built-in defaults are used.
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding the persistent index.
    #[arg(long, global = true, default_value = config::DEFAULT_INDEX_DIR)]
    index_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index documentation files.
    ///
    /// Walks DIRECTORY, skipping hidden paths and excluded directories,
    /// and upserts every chunk of every matching file. Re-running
    /// overwrites existing entries for the same files.
    Index {
        /// Directory to index.
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// File extensions to index (e.g. `.md .txt`). Defaults come from config.
        #[arg(long, num_args = 1..)]
        extensions: Option<Vec<String>>,

        /// Show files and chunk counts without embedding or writing the index.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search indexed documents.
    Search {
        /// The search query.
        query: String,

        /// Number of results.
        #[arg(short = 'n', long = "results", default_value_t = 5)]
        results: usize,
    },

    /// Show index statistics.
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsearch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config);

    match cli.command {
        Commands::Index {
            directory,
            extensions,
            dry_run,
        } => {
            println!("Indexing directory: {}", directory.display());
            if dry_run {
                ingest::plan(&cfg, &directory, extensions.as_deref(), &StdoutReporter);
            } else {
                run_index(&cfg, &cli.index_dir, &directory, extensions.as_deref()).await?;
            }
        }
        Commands::Search { query, results } => {
            run_search(&cfg, &cli.index_dir, &query, results).await?;
        }
        Commands::Stats => {
            let stats = stats::index_stats(&cli.index_dir, config::COLLECTION_NAME).await;
            print!("{}", report::format_stats(&stats));
        }
    }

    Ok(())
}

async fn open_index(index_dir: &Path) -> Result<(Arc<SqliteVectorStore>, Collection)> {
    let store = Arc::new(SqliteVectorStore::open(index_dir).await?);
    let dyn_store: Arc<dyn VectorStore> = store.clone();
    let (collection, outcome) = Collection::open_or_create(dyn_store, config::COLLECTION_NAME).await?;
    match outcome {
        OpenOutcome::Existing => println!("Loading existing index from {}", index_dir.display()),
        OpenOutcome::Created => println!("Creating new index at {}", index_dir.display()),
    }
    Ok((store, collection))
}

async fn run_index(
    cfg: &Config,
    index_dir: &Path,
    directory: &Path,
    extensions: Option<&[String]>,
) -> Result<()> {
    let embedder = embedding::create_embedder(&cfg.embedding)?;
    let (store, collection) = open_index(index_dir).await?;

    let indexer = Indexer::new(cfg, embedder.as_ref(), &collection, &StdoutReporter);
    let result = indexer.index(directory, extensions).await;

    store.close().await;
    result.map(|_| ())
}

async fn run_search(cfg: &Config, index_dir: &Path, query: &str, k: usize) -> Result<()> {
    let embedder = embedding::create_embedder(&cfg.embedding)?;
    let (store, collection) = open_index(index_dir).await?;

    let searcher = Searcher::new(embedder.as_ref(), &collection);
    let result = searcher.search(query, k).await;
    store.close().await;

    print!("{}", report::format_results(&result?, query));
    Ok(())
}
