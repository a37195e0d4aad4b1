use assessdb_core::config::EmbeddingSettings;
use assessdb_core::similarity::cosine_similarity;
use assessdb_core::traits::Embedder;
use assessdb_embed::{get_default_embedder, FakeEmbedder};

#[test]
fn fake_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { use_fake: true, fake_dim: 256, ..Default::default() };
    let embedder = get_default_embedder(&settings).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256, "embedding dim follows fake_dim");
    assert_eq!(embedder.dim(), 256);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_places_overlapping_texts_closer() {
    let embedder = FakeEmbedder::new(512);
    let q = embedder.embed_query("Python developer").expect("query");
    let near = embedder.embed_query("Assessment for a Python developer role").expect("near");
    let far = embedder.embed_query("Retail cashier customer service").expect("far");
    assert!(cosine_similarity(&q, &near) > cosine_similarity(&q, &far));
}

#[test]
fn fake_embedder_ignores_case_and_punctuation() {
    let embedder = FakeEmbedder::new(128);
    let a = embedder.embed_query("Java, SQL!").expect("a");
    let b = embedder.embed_query("java sql").expect("b");
    assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
}
