//! Labeled evaluation queries: loading, saving and building from raw rows.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::types::GroundTruthEntry;

/// One labeled row: a hiring query and the catalog URL of a relevant assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledRow {
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Assessment_url")]
    pub assessment_url: String,
}

/// The assessment slug is the last path segment of its catalog URL.
pub fn extract_assessment_id(url: &str) -> String {
    let url = url.trim().split(['?', '#']).next().unwrap_or_default();
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map_or("", |(_, p)| p),
        None => url,
    };
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string()
}

/// Group rows by trimmed query; ids per query are deduplicated and sorted.
/// Entries come out in order of first appearance of each query.
pub fn build_ground_truth<I>(rows: I) -> Vec<GroundTruthEntry>
where
    I: IntoIterator<Item = LabeledRow>,
{
    let mut order: Vec<String> = Vec::new();
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let query = row.query.trim().to_string();
        let assessment_id = extract_assessment_id(&row.assessment_url);
        if query.is_empty() || assessment_id.is_empty() {
            warn!(query = %row.query, url = %row.assessment_url, "skipping incomplete labeled row");
            continue;
        }
        if !grouped.contains_key(&query) { order.push(query.clone()); }
        grouped.entry(query).or_default().insert(assessment_id);
    }
    order
        .into_iter()
        .filter_map(|query| {
            let ids = grouped.remove(&query)?;
            Some(GroundTruthEntry { query, ground_truth_assessment_ids: ids })
        })
        .collect()
}

pub fn read_labeled_rows(path: &Path) -> Result<Vec<LabeledRow>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: LabeledRow = record.with_context(|| format!("reading row from {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruthEntry>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading ground truth {}", path.display()))?;
    let entries: Vec<GroundTruthEntry> =
        serde_json::from_str(&raw).with_context(|| format!("parsing ground truth {}", path.display()))?;
    info!(path = %path.display(), queries = entries.len(), "loaded ground truth");
    Ok(entries)
}

pub fn save_ground_truth(path: &Path, entries: &[GroundTruthEntry]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(entries)?)?;
    info!(path = %path.display(), queries = entries.len(), "saved ground truth");
    Ok(())
}
