//! Collapse chunk hits into one ranked entry per assessment.

use std::collections::HashMap;
use tracing::debug;

use assessdb_core::types::{AssessmentRecommendation, ChunkHit, ChunkMetadata};

/// Evidence snippets kept per assessment.
pub const MAX_EVIDENCE: usize = 3;

struct Accumulator {
    assessment_id: String,
    metadata: ChunkMetadata,
    score: f32,
    count: usize,
    evidence: Vec<String>,
}

impl Accumulator {
    fn finish(self) -> AssessmentRecommendation {
        let m = self.metadata;
        AssessmentRecommendation {
            assessment_id: self.assessment_id,
            name: m.name,
            url: m.url,
            job_levels: m.job_levels,
            job_family: m.job_family,
            typical_roles: m.typical_roles,
            test_types: m.test_types,
            duration_minutes: m.duration_minutes,
            remote_testing: m.remote_testing,
            adaptive: m.adaptive,
            languages: m.languages,
            match_score: self.score,
            supporting_chunks: self.count,
            evidence: self.evidence,
        }
    }
}

/// Group `hits` by assessment, sum their weights and rank by that sum.
///
/// Hits without an assessment id are skipped. Metadata is taken from the
/// last hit seen for an assessment; evidence keeps the first
/// [`MAX_EVIDENCE`] contents in encounter order. Equal scores keep
/// encounter order. At most `top_n` entries are returned.
pub fn aggregate(hits: &[ChunkHit], top_n: usize) -> Vec<AssessmentRecommendation> {
    if top_n == 0 { return Vec::new(); }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Accumulator> = Vec::new();
    let mut skipped = 0usize;

    for hit in hits {
        let Some(aid) = hit.chunk.metadata.assessment_id() else {
            skipped += 1;
            continue;
        };
        let slot = *slots.entry(aid).or_insert_with(|| {
            groups.push(Accumulator {
                assessment_id: aid.to_string(),
                metadata: ChunkMetadata::default(),
                score: 0.0,
                count: 0,
                evidence: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.score += hit.weight;
        group.count += 1;
        group.metadata = hit.chunk.metadata.clone();
        if group.evidence.len() < MAX_EVIDENCE { group.evidence.push(hit.chunk.content.clone()); }
    }
    if skipped > 0 { debug!(skipped, "dropped hits without assessment_id"); }

    let mut ranked: Vec<AssessmentRecommendation> = groups.into_iter().map(Accumulator::finish).collect();
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    ranked.truncate(top_n);
    ranked
}
