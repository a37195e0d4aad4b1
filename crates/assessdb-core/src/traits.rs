use crate::types::IndexedChunk;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single query string.
    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| crate::error::Error::Embedding("embedder returned no vector".into()).into())
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dim(&self) -> usize { (**self).dim() }
    fn max_len(&self) -> usize { (**self).max_len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}

/// Read side of a loaded embedding index snapshot.
///
/// Implementations must be safe for concurrent reads; nothing here mutates.
pub trait EmbeddingIndex: Send + Sync {
    /// Number of chunks in the snapshot.
    fn len(&self) -> anyhow::Result<usize>;

    fn is_empty(&self) -> anyhow::Result<bool> { Ok(self.len()? == 0) }

    /// The `k` chunks nearest to `query_vec`, most similar first, each with
    /// its stored vector and cosine similarity to the query.
    fn search(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<IndexedChunk>>;
}

impl<I: EmbeddingIndex + ?Sized> EmbeddingIndex for Box<I> {
    fn len(&self) -> anyhow::Result<usize> { (**self).len() }
    fn search(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<IndexedChunk>> { (**self).search(query_vec, k) }
}
