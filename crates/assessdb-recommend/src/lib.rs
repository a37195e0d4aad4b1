//! Query → diverse chunk hits → ranked assessments.

use anyhow::Result;
use tracing::{debug, info};

use assessdb_core::config::{HitWeight, RetrievalSettings};
use assessdb_core::traits::{Embedder, EmbeddingIndex};
use assessdb_core::types::{AssessmentRecommendation, ChunkHit, RecommendationSummary};

pub mod aggregate;
pub mod mmr;

pub use aggregate::{aggregate, MAX_EVIDENCE};
pub use mmr::maximal_marginal_relevance;

/// Anything that turns a query into ranked assessments. The evaluation
/// harness is written against this seam.
pub trait AssessmentRanker: Send + Sync {
    fn rank(&self, query: &str, top_n: usize) -> Result<Vec<AssessmentRecommendation>>;
}

/// The recommendation service: one loaded index, one embedder, fixed
/// retrieval settings. Build it once and share it by reference.
pub struct Recommender<I> where I: EmbeddingIndex {
    index: I,
    embedder: Box<dyn Embedder>,
    settings: RetrievalSettings,
}

impl<I> Recommender<I> where I: EmbeddingIndex {
    pub fn new(index: I, embedder: Box<dyn Embedder>, settings: RetrievalSettings) -> Result<Self> {
        settings.validate()?;
        info!(k = settings.k, fetch_k = settings.fetch_k, lambda = settings.lambda, "recommender ready");
        Ok(Self { index, embedder, settings })
    }

    pub fn settings(&self) -> &RetrievalSettings { &self.settings }

    pub fn index(&self) -> &I { &self.index }

    /// Diverse candidate selection: embed the query, pull `fetch_k`
    /// neighbours and keep `k` of them by MMR. A blank query or an empty
    /// index yields no hits.
    pub fn select(&self, query: &str) -> Result<Vec<ChunkHit>> {
        let query = query.trim();
        if query.is_empty() { return Ok(Vec::new()); }

        let query_vec = self.embedder.embed_query(query)?;
        let pool = self.index.search(&query_vec, self.settings.fetch_k)?;
        if pool.is_empty() { return Ok(Vec::new()); }

        let sims: Vec<f32> = pool.iter().map(|c| c.similarity).collect();
        let vectors: Vec<Vec<f32>> = pool.iter().map(|c| c.vector.clone()).collect();
        let picks = maximal_marginal_relevance(&sims, &vectors, self.settings.k, self.settings.lambda);
        debug!(pool = pool.len(), selected = picks.len(), "mmr selection");

        let mut slots: Vec<Option<_>> = pool.into_iter().map(Some).collect();
        Ok(picks
            .into_iter()
            .filter_map(|i| slots[i].take())
            .map(|c| {
                let weight = match self.settings.hit_weight {
                    HitWeight::Similarity => c.similarity,
                    HitWeight::Uniform => 1.0,
                };
                ChunkHit::new(c.chunk, weight)
            })
            .collect())
    }

    /// Full recommendation records, at most `top_n`.
    pub fn recommend_detailed(&self, query: &str, top_n: usize) -> Result<Vec<AssessmentRecommendation>> {
        let hits = self.select(query)?;
        Ok(aggregate(&hits, top_n))
    }

    /// Caller-facing call; `top_k` is clamped to at least 1.
    pub fn recommend(&self, query: &str, top_k: usize) -> Result<Vec<RecommendationSummary>> {
        let recs = self.recommend_detailed(query, top_k.max(1))?;
        Ok(recs.iter().map(RecommendationSummary::from).collect())
    }
}

impl<I> AssessmentRanker for Recommender<I> where I: EmbeddingIndex {
    fn rank(&self, query: &str, top_n: usize) -> Result<Vec<AssessmentRecommendation>> {
        self.recommend_detailed(query, top_n)
    }
}
