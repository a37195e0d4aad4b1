//! Wiring shared by the command-line tools.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use assessdb_core::config::{expand_path, Config, Settings};
use assessdb_core::error::is_index_not_found;
use assessdb_core::traits::EmbeddingIndex;
use assessdb_embed::get_default_embedder;
use assessdb_recommend::Recommender;
use assessdb_vector::{LanceIndex, MemoryIndex};

pub type CliRecommender = Recommender<Box<dyn EmbeddingIndex>>;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails only when a global subscriber is already installed.
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init() {
        eprintln!("tracing already initialized: {e}");
    }
}

pub fn load_settings() -> Result<Settings> {
    Config::load().context("loading configuration")?.settings()
}

/// The in-memory snapshot when `memory` is given, otherwise the LanceDB table
/// named in the settings.
pub fn open_index(settings: &Settings, memory: Option<&Path>) -> Result<Box<dyn EmbeddingIndex>> {
    let opened: Result<Box<dyn EmbeddingIndex>> = match memory {
        Some(path) => MemoryIndex::load(path).map(|i| Box::new(i) as Box<dyn EmbeddingIndex>),
        None => {
            let db_path = expand_path(&settings.data.index_dir);
            LanceIndex::open(&db_path, &settings.data.table_name).map(|i| Box::new(i) as Box<dyn EmbeddingIndex>)
        }
    };
    opened.map_err(|e| {
        if is_index_not_found(&e) {
            e.context("no index available; build one with assessdb-indexer")
        } else {
            e
        }
    })
}

pub fn build_recommender(settings: &Settings, memory: Option<&Path>) -> Result<CliRecommender> {
    let index = open_index(settings, memory)?;
    info!(chunks = index.len()?, "index opened");
    let embedder = get_default_embedder(&settings.embedding)?;
    Recommender::new(index, embedder, settings.retrieval.clone())
}
