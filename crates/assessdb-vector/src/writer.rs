use anyhow::Result;
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use assessdb_core::error::Error;
use assessdb_core::types::Chunk;

use crate::schema::build_chunk_schema;
use crate::table::{open_db, table_exists};

const BATCH_SIZE: usize = 1000;

/// Appends chunks and their embeddings to a LanceDB table, creating it on
/// the first batch.
pub struct LanceIndexWriter { db: Connection, table_name: String }

impl LanceIndexWriter {
    pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
        std::fs::create_dir_all(db_path)?;
        let db = open_db(&db_path.to_string_lossy()).await?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    pub async fn write(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        if chunks.is_empty() { info!("no chunks to index"); return Ok(0); }
        if chunks.len() != embeddings.len() {
            return Err(Error::Operation(format!("{} chunks but {} embeddings", chunks.len(), embeddings.len())).into());
        }
        let dim = embeddings[0].len();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
            return Err(Error::DimensionMismatch { expected: dim, actual: bad.len() }.into());
        }
        info!(chunks = chunks.len(), table = %self.table_name, dim, "writing chunks to LanceDB");
        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?
                .progress_chars("#>-"),
        );
        let mut processed = 0usize;
        for (chunk_batch, emb_batch) in chunks.chunks(BATCH_SIZE).zip(embeddings.chunks(BATCH_SIZE)) {
            self.insert_batch(chunk_batch, emb_batch, dim).await?;
            processed += chunk_batch.len();
            pb.set_position(processed as u64);
        }
        pb.finish_with_message("done");
        info!(processed, table = %self.table_name, "LanceDB indexing completed");
        Ok(processed)
    }

    async fn insert_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>], dim: usize) -> Result<()> {
        let record_batch = to_record_batch(chunks, embeddings, dim)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if table_exists(&self.db, &self.table_name).await? {
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        Ok(())
    }
}

fn to_record_batch(chunks: &[Chunk], embeddings: &[Vec<f32>], dim: usize) -> Result<RecordBatch> {
    let dim = i32::try_from(dim).map_err(|_| Error::Operation(format!("vector dimension {dim} too large")))?;
    let schema = build_chunk_schema(dim);
    let mut ids = Vec::with_capacity(chunks.len());
    let mut assessment_ids = Vec::with_capacity(chunks.len());
    let mut contents = Vec::with_capacity(chunks.len());
    let mut metadata = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        ids.push(chunk.id.clone());
        assessment_ids.push(chunk.metadata.assessment_id.clone());
        contents.push(chunk.content.clone());
        metadata.push(serde_json::to_string(&chunk.metadata)?);
    }
    let vectors = embeddings.iter().map(|e| Some(e.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
    let record_batch = RecordBatch::try_new(schema, vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(assessment_ids)),
        Arc::new(StringArray::from(contents)),
        Arc::new(StringArray::from(metadata)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
    ])?;
    Ok(record_batch)
}
