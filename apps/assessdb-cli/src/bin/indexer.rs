use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use assessdb_cli::{init_tracing, load_settings};
use assessdb_core::catalog::{load_catalog, CatalogChunker};
use assessdb_core::config::expand_path;
use assessdb_core::traits::Embedder;
use assessdb_embed::get_default_embedder;
use assessdb_vector::{LanceIndexWriter, MemoryIndex};

/// Chunk the structured catalog, embed every chunk and rebuild the index.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Structured catalog JSON (defaults to `data.catalog_path`).
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Write an in-memory snapshot to this file instead of a LanceDB table.
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Only index the first N catalog records.
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;

    let catalog_path = args.catalog.unwrap_or_else(|| expand_path(&settings.data.catalog_path));
    let mut records = load_catalog(&catalog_path)?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }
    let chunks = CatalogChunker::new(settings.chunking.clone()).chunk_catalog(&records);
    info!(records = records.len(), chunks = chunks.len(), "catalog chunked");

    let embedder = get_default_embedder(&settings.embedding)?;
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).context("embedding chunks")?;

    let written = if let Some(path) = args.memory {
        let count = chunks.len();
        MemoryIndex::from_parts(chunks, embeddings)?.save(&path)?;
        println!("Wrote {count} chunks to {}", path.display());
        count
    } else {
        let db_path = expand_path(&settings.data.index_dir);
        if db_path.exists() {
            fs::remove_dir_all(&db_path)?;
        }
        let runtime = tokio::runtime::Runtime::new()?;
        let count = runtime.block_on(async {
            let writer = LanceIndexWriter::new(&db_path, &settings.data.table_name).await?;
            writer.write(&chunks, &embeddings).await
        })?;
        println!("Wrote {count} chunks to {} (table {})", db_path.display(), settings.data.table_name);
        count
    };
    info!(written, "indexing completed");
    Ok(())
}
