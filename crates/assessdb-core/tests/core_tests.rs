use std::fs;
use tempfile::TempDir;

use assessdb_core::catalog::{load_catalog, CatalogChunker, StructuredAssessment};
use assessdb_core::config::{expand_path, ChunkingSettings, Config, HitWeight, RetrievalSettings, Settings};
use assessdb_core::error::Error;
use assessdb_core::ground_truth::{build_ground_truth, extract_assessment_id, load_ground_truth, save_ground_truth, LabeledRow};
use assessdb_core::similarity::{cosine_similarity, l2_normalize};
use assessdb_core::types::{ChunkMetadata, GroundTruthEntry};

fn sample_record(pdf_words: usize) -> StructuredAssessment {
    let pdf_text = (0..pdf_words).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    serde_json::from_value(serde_json::json!({
        "assessment_id": "python-new",
        "name": "Python (New)",
        "url": "https://example.com/view/python-new/",
        "job_profile": { "job_levels": ["Mid-Professional", "Professional Individual Contributor"], "typical_roles": ["Developer"] },
        "assessment_metadata": { "duration_minutes": 11, "test_types": ["Knowledge & Skills"], "remote_testing": true },
        "languages": ["English (USA)"],
        "skills_competencies": ["Python"],
        "text_corpus": { "description": "Multi-choice test of Python programming.", "pdf_text": pdf_text }
    }))
    .expect("record")
}

#[test]
fn chunker_emits_profile_description_and_overlapping_windows() {
    let chunker = CatalogChunker::new(ChunkingSettings { max_words: 10, overlap_percent: 0.2 });
    let chunks = chunker.chunk_assessment(&sample_record(25));

    // profile + description + windows starting at 0, 8, 16
    assert_eq!(chunks.len(), 5);
    assert!(chunks[0].content.starts_with("Assessment Name: Python (New)"));
    assert!(chunks[0].content.contains("Duration: 11 minutes"));
    assert!(chunks[1].content.starts_with("Description: "));
    assert!(chunks[2].content.contains("w0 ") && chunks[2].content.ends_with("w9"));
    assert!(chunks[3].content.contains("w8 "), "windows overlap by two words");
    assert!(chunks[4].content.ends_with("w24"));

    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["python-new:0", "python-new:1", "python-new:2", "python-new:3", "python-new:4"]);
    for c in &chunks {
        assert_eq!(c.metadata.assessment_id(), Some("python-new"));
        assert_eq!(c.metadata.duration_minutes, Some(11));
        assert_eq!(c.metadata.remote_testing, Some(true));
    }
}

#[test]
fn chunk_catalog_skips_records_without_id() {
    let mut missing = sample_record(0);
    missing.assessment_id = "  ".to_string();
    let chunker = CatalogChunker::default();
    let chunks = chunker.chunk_catalog(&[missing, sample_record(0)]);
    assert_eq!(chunks.len(), 2, "only the valid record's profile + description");
}

#[test]
fn load_catalog_reads_json_array() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("catalog.json");
    fs::write(&path, r#"[{"assessment_id":"a","name":"A"},{"assessment_id":"b","name":"B","languages":["English"]}]"#).expect("write");
    let records = load_catalog(&path).expect("catalog");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].languages, vec!["English".to_string()]);
    assert!(records[0].job_profile.job_levels.is_empty());
}

#[test]
fn metadata_validation_blanks_out_empty_ids() {
    let meta = ChunkMetadata { assessment_id: Some("   ".into()), ..Default::default() }.validated();
    assert_eq!(meta.assessment_id, None);
    let meta = ChunkMetadata { assessment_id: Some(" x ".into()), ..Default::default() }.validated();
    assert_eq!(meta.assessment_id(), Some("x"));
}

#[test]
fn assessment_id_is_last_url_segment() {
    assert_eq!(extract_assessment_id("https://www.shl.com/products/product-catalog/view/python-new/"), "python-new");
    assert_eq!(extract_assessment_id("https://example.com/view/java-8?x=1#top"), "java-8");
    assert_eq!(extract_assessment_id("/view/sql-server/"), "sql-server");
    assert_eq!(extract_assessment_id("https://example.com"), "");
}

#[test]
fn ground_truth_groups_dedups_and_sorts() {
    let row = |q: &str, u: &str| LabeledRow { query: q.to_string(), assessment_url: u.to_string() };
    let entries = build_ground_truth(vec![
        row("Java dev ", "https://x.com/view/java-8/"),
        row("Sales lead", "https://x.com/view/sales/"),
        row("Java dev", "https://x.com/view/core-java/"),
        row("Java dev", "https://x.com/view/java-8/"),
        row("", "https://x.com/view/ignored/"),
    ]);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], GroundTruthEntry::new("Java dev", ["core-java", "java-8"]));
    assert_eq!(entries[1].query, "Sales lead");

    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("eval/ground_truth.json");
    save_ground_truth(&path, &entries).expect("save");
    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.contains("\"ground_truth_assessment_ids\""));
    assert_eq!(load_ground_truth(&path).expect("load"), entries);
}

#[test]
fn retrieval_settings_defaults_and_validation() {
    let defaults = RetrievalSettings::default();
    assert_eq!((defaults.k, defaults.fetch_k), (15, 40));
    assert!((defaults.lambda - 0.6).abs() < f32::EPSILON);
    assert_eq!(defaults.hit_weight, HitWeight::Similarity);
    assert!(defaults.validate().is_ok());

    let bad_pool = RetrievalSettings { fetch_k: 10, ..defaults.clone() };
    assert!(matches!(bad_pool.validate(), Err(Error::InvalidConfig(_))));
    let bad_lambda = RetrievalSettings { lambda: 1.5, ..defaults };
    assert!(matches!(bad_lambda.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn config_merges_toml_files_over_defaults() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.toml"), "[retrieval]\nk = 10\nhit_weight = \"uniform\"\n").expect("write");
    fs::write(tmp.path().join("config.test.toml"), "[eval]\nmrr_depth = 20\n").expect("write");

    let settings = Config::load_from(tmp.path(), "test").expect("config").settings().expect("settings");
    assert_eq!(settings.retrieval.k, 10);
    assert_eq!(settings.retrieval.fetch_k, 40);
    assert_eq!(settings.retrieval.hit_weight, HitWeight::Uniform);
    assert_eq!(settings.eval.mrr_depth, 20);
    assert_eq!(settings.recommend.default_top_k, Settings::default().recommend.default_top_k);
}

#[test]
fn config_rejects_invalid_pool_size() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("config.toml"), "[retrieval]\nk = 50\nfetch_k = 40\n").expect("write");
    let err = Config::load_from(tmp.path(), "prod").err().expect("invalid config");
    assert!(err.to_string().contains("fetch_k"));
}

#[test]
fn cosine_and_normalize() {
    assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    let mut v = vec![3.0, 4.0];
    l2_normalize(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
}

#[test]
fn data_paths_expand_variables_and_keep_unknown_ones() {
    std::env::set_var("ASSESSDB_TEST_DATA_ROOT", "/srv/assess");
    assert_eq!(expand_path("$ASSESSDB_TEST_DATA_ROOT/catalog.json"), std::path::PathBuf::from("/srv/assess/catalog.json"));
    assert_eq!(expand_path("data/indexes/lancedb"), std::path::PathBuf::from("data/indexes/lancedb"));
    assert_eq!(
        expand_path("$ASSESSDB_TEST_UNSET_VAR/x"),
        std::path::PathBuf::from("$ASSESSDB_TEST_UNSET_VAR/x")
    );
}
