use anyhow::{anyhow, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use assessdb_core::error::Error;
use assessdb_core::similarity::cosine_similarity;
use assessdb_core::traits::EmbeddingIndex;
use assessdb_core::types::{Chunk, ChunkMetadata, IndexedChunk};

use crate::schema::vector_dim;
use crate::table::{open_db, table_exists};

/// A persisted LanceDB chunk table opened for reading.
///
/// Owns a private tokio runtime so the `EmbeddingIndex` surface stays
/// synchronous. Do not call it from inside another tokio runtime.
pub struct LanceIndex {
    runtime: Runtime,
    table: Table,
    table_name: String,
    dim: usize,
}

impl LanceIndex {
    /// Open `table_name` under `db_path`. A missing directory or table is
    /// reported as [`Error::IndexNotFound`].
    pub fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        if !db_path.exists() {
            return Err(Error::IndexNotFound(format!("no LanceDB directory at {}", db_path.display())).into());
        }
        let runtime = Runtime::new()?;
        let uri = db_path.to_string_lossy().to_string();
        let (table, dim) = runtime.block_on(async {
            let db = open_db(&uri).await?;
            if !table_exists(&db, table_name).await? {
                return Err(anyhow::Error::from(Error::IndexNotFound(format!("table '{table_name}' missing in {uri}"))));
            }
            let table = db.open_table(table_name).execute().await?;
            let schema = table.schema().await?;
            let dim = vector_dim(&schema).ok_or_else(|| anyhow!("table '{table_name}' has no fixed-size vector column"))?;
            Ok((table, dim))
        })?;
        info!(db = %db_path.display(), table = table_name, dim, "opened LanceDB index");
        Ok(Self { runtime, table, table_name: table_name.to_string(), dim })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn table_name(&self) -> &str { &self.table_name }
}

impl EmbeddingIndex for LanceIndex {
    fn len(&self) -> Result<usize> {
        Ok(self.runtime.block_on(self.table.count_rows(None))?)
    }

    fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<IndexedChunk>> {
        if k == 0 { return Ok(Vec::new()); }
        if query_vec.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query_vec.len() }.into());
        }
        let batches: Vec<RecordBatch> = self.runtime.block_on(async {
            let stream = self
                .table
                .vector_search(query_vec.to_vec())?
                .distance_type(DistanceType::Cosine)
                .limit(k)
                .execute()
                .await?;
            Ok::<_, anyhow::Error>(stream.try_collect::<Vec<_>>().await?)
        })?;

        let mut hits = Vec::new();
        for batch in &batches {
            read_batch(batch, query_vec, &mut hits)?;
        }
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        debug!(table = %self.table_name, k, returned = hits.len(), "lance vector search");
        Ok(hits)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_string_opt::<i32>())
        .ok_or_else(|| anyhow!("column '{name}' missing or not utf8"))
}

fn read_batch(batch: &RecordBatch, query_vec: &[f32], out: &mut Vec<IndexedChunk>) -> Result<()> {
    let ids = string_column(batch, "id")?;
    let contents = string_column(batch, "content")?;
    let metadata = string_column(batch, "metadata")?;
    let vectors = batch
        .column_by_name("vector")
        .and_then(|c| c.as_fixed_size_list_opt())
        .ok_or_else(|| anyhow!("column 'vector' missing or not a fixed-size list"))?;

    for i in 0..batch.num_rows() {
        if vectors.is_null(i) { continue; }
        let list = vectors.value(i);
        let Some(values) = list.as_primitive_opt::<Float32Type>() else { continue };
        let vector = values.values().to_vec();
        let meta = match serde_json::from_str::<ChunkMetadata>(metadata.value(i)) {
            Ok(m) => m.validated(),
            Err(e) => {
                warn!(chunk = ids.value(i), error = %e, "unreadable chunk metadata; keeping chunk without assessment id");
                ChunkMetadata::default()
            }
        };
        let similarity = cosine_similarity(query_vec, &vector);
        out.push(IndexedChunk {
            chunk: Chunk { id: ids.value(i).to_string(), content: contents.value(i).to_string(), metadata: meta },
            vector,
            similarity,
        });
    }
    Ok(())
}
