//! Offline retrieval quality: recall@k and MRR over labeled queries.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use assessdb_core::error::Error;
use assessdb_core::types::GroundTruthEntry;
use assessdb_recommend::AssessmentRanker;

pub use assessdb_core::ground_truth::load_ground_truth;

pub const DEFAULT_MRR_DEPTH: usize = 10;

/// What one labeled query returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: String,
    /// 1-based position of the first relevant assessment, if any was returned.
    pub first_hit_rank: Option<usize>,
    pub retrieved_ids: Vec<String>,
}

impl QueryOutcome {
    fn hit_within(&self, k: usize) -> bool { self.first_hit_rank.is_some_and(|r| r <= k) }

    fn reciprocal_rank_within(&self, depth: usize) -> f64 {
        match self.first_hit_rank {
            Some(r) if r <= depth => 1.0 / r as f64,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub queries: usize,
    pub recall_at_5: f64,
    pub recall_at_10: f64,
    pub mrr: f64,
    pub mrr_depth: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<QueryOutcome>,
}

impl EvaluationReport {
    /// Metrics rounded to two decimals, per-query outcomes dropped.
    pub fn rounded(&self) -> Self {
        let r2 = |v: f64| (v * 100.0).round() / 100.0;
        Self {
            queries: self.queries,
            recall_at_5: r2(self.recall_at_5),
            recall_at_10: r2(self.recall_at_10),
            mrr: r2(self.mrr),
            mrr_depth: self.mrr_depth,
            outcomes: Vec::new(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Queries:   {}", self.queries)?;
        writeln!(f, "Recall@5:  {:.2}", self.recall_at_5)?;
        writeln!(f, "Recall@10: {:.2}", self.recall_at_10)?;
        write!(f, "MRR@{}:    {:.2}", self.mrr_depth, self.mrr)
    }
}

/// Replays labeled queries through a ranker. Holds the ranker by reference;
/// nothing is cached between metric calls.
pub struct Evaluator<'a, R: AssessmentRanker + ?Sized> {
    ranker: &'a R,
    entries: Vec<GroundTruthEntry>,
    mrr_depth: usize,
}

impl<'a, R: AssessmentRanker + ?Sized> Evaluator<'a, R> {
    pub fn new(ranker: &'a R, entries: Vec<GroundTruthEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::EmptyGroundTruth.into());
        }
        Ok(Self { ranker, entries, mrr_depth: DEFAULT_MRR_DEPTH })
    }

    pub fn with_mrr_depth(mut self, depth: usize) -> Self {
        self.mrr_depth = depth.max(1);
        self
    }

    /// Fraction of queries with at least one relevant assessment in the top `k`.
    pub fn recall_at_k(&self, k: usize) -> Result<f64> {
        let outcomes = self.run(k)?;
        let hits = outcomes.iter().filter(|o| o.hit_within(k)).count();
        Ok(hits as f64 / outcomes.len() as f64)
    }

    pub fn mrr(&self) -> Result<f64> { self.mrr_at(self.mrr_depth) }

    /// Mean reciprocal rank of the first relevant assessment within `depth`;
    /// a query without one contributes 0.
    pub fn mrr_at(&self, depth: usize) -> Result<f64> {
        let outcomes = self.run(depth)?;
        Ok(mean_reciprocal_rank(&outcomes, depth))
    }

    /// All metrics from a single pass at the deepest depth any of them needs.
    pub fn report(&self) -> Result<EvaluationReport> {
        let depth = self.mrr_depth.max(10);
        let outcomes = self.run(depth)?;
        let n = outcomes.len() as f64;
        let recall = |k: usize| outcomes.iter().filter(|o| o.hit_within(k)).count() as f64 / n;
        let report = EvaluationReport {
            queries: outcomes.len(),
            recall_at_5: recall(5),
            recall_at_10: recall(10),
            mrr: mean_reciprocal_rank(&outcomes, self.mrr_depth),
            mrr_depth: self.mrr_depth,
            outcomes,
        };
        info!(
            queries = report.queries,
            recall_at_5 = report.recall_at_5,
            recall_at_10 = report.recall_at_10,
            mrr = report.mrr,
            "evaluation finished"
        );
        Ok(report)
    }

    fn run(&self, top_n: usize) -> Result<Vec<QueryOutcome>> {
        if self.entries.is_empty() {
            return Err(Error::EmptyGroundTruth.into());
        }
        let mut outcomes = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let recs = self.ranker.rank(&entry.query, top_n)?;
            let retrieved_ids: Vec<String> = recs.into_iter().map(|r| r.assessment_id).collect();
            let first_hit_rank = retrieved_ids.iter().position(|id| entry.is_relevant(id)).map(|p| p + 1);
            debug!(query = %entry.query, ?first_hit_rank, returned = retrieved_ids.len(), "evaluated query");
            outcomes.push(QueryOutcome { query: entry.query.clone(), first_hit_rank, retrieved_ids });
        }
        Ok(outcomes)
    }
}

fn mean_reciprocal_rank(outcomes: &[QueryOutcome], depth: usize) -> f64 {
    let total: f64 = outcomes.iter().map(|o| o.reciprocal_rank_within(depth)).sum();
    total / outcomes.len() as f64
}
