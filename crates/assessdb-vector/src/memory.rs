//! Flat in-memory index with a JSON snapshot format.
//!
//! Search is an exact cosine scan, which is plenty for catalogs of a few
//! thousand chunks and keeps tests free of any storage engine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use assessdb_core::error::Error;
use assessdb_core::similarity::cosine_similarity;
use assessdb_core::traits::EmbeddingIndex;
use assessdb_core::types::{Chunk, IndexedChunk};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    dim: usize,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    dim: usize,
    entries: Vec<SnapshotEntry>,
}

impl MemoryIndex {
    /// Build an index from chunks and their embeddings (same order, same length).
    pub fn from_parts(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::Operation(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            ))
            .into());
        }
        let dim = embeddings.first().map_or(0, Vec::len);
        let mut entries = Vec::with_capacity(chunks.len());
        for (mut chunk, vector) in chunks.into_iter().zip(embeddings) {
            if vector.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: vector.len() }.into());
            }
            chunk.metadata = chunk.metadata.validated();
            entries.push(SnapshotEntry { chunk, vector });
        }
        Ok(Self { dim, entries })
    }

    /// Load a snapshot written by [`MemoryIndex::save`]. A missing file is
    /// reported as [`Error::IndexNotFound`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::IndexNotFound(format!("no index snapshot at {}", path.display())).into());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let (chunks, vectors): (Vec<_>, Vec<_>) = snapshot.entries.into_iter().map(|e| (e.chunk, e.vector)).unzip();
        let mut index = Self::from_parts(chunks, vectors)?;
        if index.entries.is_empty() { index.dim = snapshot.dim; }
        info!(path = %path.display(), chunks = index.entries.len(), dim = index.dim, "loaded memory index");
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let snapshot = Snapshot { dim: self.dim, entries: self.entries.clone() };
        fs::write(path, serde_json::to_vec(&snapshot)?).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), chunks = self.entries.len(), "saved memory index");
        Ok(())
    }

    pub fn dim(&self) -> usize { self.dim }
}

impl EmbeddingIndex for MemoryIndex {
    fn len(&self) -> Result<usize> { Ok(self.entries.len()) }

    fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<IndexedChunk>> {
        if self.entries.is_empty() || k == 0 { return Ok(Vec::new()); }
        if query_vec.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query_vec.len() }.into());
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_vec, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        debug!(k, returned = scored.len(), "memory index scan");
        Ok(scored
            .into_iter()
            .map(|(i, similarity)| {
                let entry = &self.entries[i];
                IndexedChunk { chunk: entry.chunk.clone(), vector: entry.vector.clone(), similarity }
            })
            .collect())
    }
}
