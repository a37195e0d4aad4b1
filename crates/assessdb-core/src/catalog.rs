//! Structured assessment catalog and its conversion into indexable chunks.
//!
//! Each assessment yields a profile chunk (name, job profile, test metadata,
//! skills), a description chunk, and one or more overlapping windows over the
//! fact-sheet text. Every chunk carries the same [`ChunkMetadata`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::ChunkingSettings;
use crate::types::{Chunk, ChunkMetadata};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProfile {
    pub job_levels: Vec<String>,
    pub job_family: Option<String>,
    pub typical_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentDetails {
    pub duration_minutes: Option<u32>,
    pub remote_testing: Option<bool>,
    pub adaptive: Option<bool>,
    pub test_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextCorpus {
    pub description: Option<String>,
    pub pdf_text: Option<String>,
}

/// One record of the structured catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredAssessment {
    pub assessment_id: String,
    pub name: String,
    pub url: Option<String>,
    pub job_profile: JobProfile,
    pub assessment_metadata: AssessmentDetails,
    pub languages: Vec<String>,
    pub skills_competencies: Vec<String>,
    pub text_corpus: TextCorpus,
}

impl StructuredAssessment {
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            assessment_id: Some(self.assessment_id.clone()),
            name: self.name.clone(),
            url: self.url.clone(),
            job_levels: self.job_profile.job_levels.clone(),
            job_family: self.job_profile.job_family.clone(),
            typical_roles: self.job_profile.typical_roles.clone(),
            test_types: self.assessment_metadata.test_types.clone(),
            duration_minutes: self.assessment_metadata.duration_minutes,
            remote_testing: self.assessment_metadata.remote_testing,
            adaptive: self.assessment_metadata.adaptive,
            languages: self.languages.clone(),
        }
        .validated()
    }

    /// Labelled header text describing the assessment as a whole.
    pub fn profile_text(&self) -> String {
        let mut parts = vec![format!("Assessment Name: {}", self.name)];
        let profile = &self.job_profile;
        if !profile.job_levels.is_empty() { parts.push(format!("Job Levels: {}", profile.job_levels.join(", "))); }
        if !profile.typical_roles.is_empty() { parts.push(format!("Typical Roles: {}", profile.typical_roles.join(", "))); }
        if let Some(family) = profile.job_family.as_deref().filter(|f| !f.is_empty()) { parts.push(format!("Job Family: {family}")); }
        let meta = &self.assessment_metadata;
        if let Some(minutes) = meta.duration_minutes.filter(|m| *m > 0) { parts.push(format!("Duration: {minutes} minutes")); }
        if !meta.test_types.is_empty() { parts.push(format!("Test Types: {}", meta.test_types.join(", "))); }
        if !self.skills_competencies.is_empty() {
            parts.push(format!("Skills & Competencies: {}", self.skills_competencies.join(" | ")));
        }
        parts.join("\n")
    }
}

pub fn load_catalog(path: &Path) -> Result<Vec<StructuredAssessment>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let records: Vec<StructuredAssessment> =
        serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "loaded assessment catalog");
    Ok(records)
}

#[derive(Debug, Clone, Default)]
pub struct CatalogChunker {
    config: ChunkingSettings,
}

impl CatalogChunker {
    pub fn new(config: ChunkingSettings) -> Self { Self { config } }

    pub fn chunk_catalog(&self, records: &[StructuredAssessment]) -> Vec<Chunk> {
        let mut all_chunks = Vec::new();
        for record in records {
            if record.assessment_id.trim().is_empty() {
                warn!(name = %record.name, "skipping catalog record without assessment_id");
                continue;
            }
            all_chunks.extend(self.chunk_assessment(record));
        }
        info!(records = records.len(), chunks = all_chunks.len(), "chunked catalog");
        all_chunks
    }

    pub fn chunk_assessment(&self, record: &StructuredAssessment) -> Vec<Chunk> {
        let metadata = record.metadata();
        let mut texts = vec![record.profile_text()];
        if let Some(description) = non_blank(record.text_corpus.description.as_deref()) {
            texts.push(format!("Description: {description}"));
        }
        if let Some(pdf_text) = non_blank(record.text_corpus.pdf_text.as_deref()) {
            for window in self.split_with_overlap(pdf_text) {
                texts.push(format!("{}\nFact Sheet: {window}", record.name));
            }
        }
        texts
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk { id: format!("{}:{}", record.assessment_id, i), content, metadata: metadata.clone() })
            .collect()
    }

    fn split_with_overlap(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let words_per_chunk = self.config.max_words.max(1);
        let overlap_words = ((words_per_chunk as f32 * self.config.overlap_percent) as usize).min(words_per_chunk - 1);
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + words_per_chunk).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() { break; }
            start = end - overlap_words;
        }
        chunks
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> { s.map(str::trim).filter(|s| !s.is_empty()) }
