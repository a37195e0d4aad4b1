//! Domain types shared by the index, the recommender and the evaluation harness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type ChunkId = String;
pub type AssessmentId = String;

/// Descriptive fields attached to every indexed chunk.
///
/// All chunks of one assessment carry identical metadata. `assessment_id` is
/// optional only so that malformed rows survive loading; such chunks are
/// dropped during aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    pub assessment_id: Option<AssessmentId>,
    pub name: String,
    pub url: Option<String>,
    pub job_levels: Vec<String>,
    pub job_family: Option<String>,
    pub typical_roles: Vec<String>,
    pub test_types: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub remote_testing: Option<bool>,
    pub adaptive: Option<bool>,
    pub languages: Vec<String>,
}

impl ChunkMetadata {
    /// Normalize metadata read from a persisted index: blank ids become `None`
    /// and surrounding whitespace is trimmed.
    pub fn validated(mut self) -> Self {
        self.assessment_id = self
            .assessment_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        self.job_family = self.job_family.filter(|f| !f.trim().is_empty());
        self
    }

    pub fn assessment_id(&self) -> Option<&str> {
        self.assessment_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A unit of indexed text tied to one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned by an index lookup together with its stored vector and
/// its cosine similarity to the query vector.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
    pub similarity: f32,
}

/// A chunk selected for a query, weighted for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub chunk: Chunk,
    pub weight: f32,
}

impl ChunkHit {
    pub fn new(chunk: Chunk, weight: f32) -> Self { Self { chunk, weight } }
}

/// All hits of one assessment within a single query's result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecommendation {
    pub assessment_id: AssessmentId,
    pub name: String,
    pub url: Option<String>,
    pub job_levels: Vec<String>,
    pub job_family: Option<String>,
    pub typical_roles: Vec<String>,
    pub test_types: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub remote_testing: Option<bool>,
    pub adaptive: Option<bool>,
    pub languages: Vec<String>,
    pub match_score: f32,
    pub supporting_chunks: usize,
    pub evidence: Vec<String>,
}

/// The caller-facing shape of a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub assessment_id: AssessmentId,
    pub name: String,
    pub match_score: f32,
    pub job_levels: Vec<String>,
    pub test_types: Vec<String>,
    pub duration_minutes: Option<u32>,
}

impl From<&AssessmentRecommendation> for RecommendationSummary {
    fn from(rec: &AssessmentRecommendation) -> Self {
        Self {
            assessment_id: rec.assessment_id.clone(),
            name: rec.name.clone(),
            match_score: (rec.match_score * 1000.0).round() / 1000.0,
            job_levels: rec.job_levels.clone(),
            test_types: rec.test_types.clone(),
            duration_minutes: rec.duration_minutes,
        }
    }
}

/// One labeled evaluation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    pub query: String,
    pub ground_truth_assessment_ids: BTreeSet<AssessmentId>,
}

impl GroundTruthEntry {
    pub fn new<I, S>(query: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: query.into(),
            ground_truth_assessment_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_relevant(&self, assessment_id: &str) -> bool {
        self.ground_truth_assessment_ids.contains(assessment_id)
    }
}
