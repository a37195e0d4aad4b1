use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use std::sync::Arc;
use tempfile::TempDir;

use assessdb_core::error::is_index_not_found;
use assessdb_core::traits::{Embedder, EmbeddingIndex};
use assessdb_core::types::{Chunk, ChunkHit, ChunkMetadata};
use assessdb_embed::FakeEmbedder;
use assessdb_recommend::aggregate;
use assessdb_vector::schema::build_chunk_schema;
use assessdb_vector::table::open_db;
use assessdb_vector::{LanceIndex, LanceIndexWriter};

fn chunks() -> Vec<Chunk> {
    let mk = |id: &str, aid: &str, content: &str| Chunk {
        id: id.to_string(),
        content: content.to_string(),
        metadata: ChunkMetadata {
            assessment_id: Some(aid.to_string()),
            name: aid.to_uppercase(),
            job_levels: vec!["Graduate".to_string()],
            duration_minutes: Some(20),
            ..Default::default()
        },
    };
    vec![
        mk("java-8:0", "java-8", "Java 8 programming knowledge test"),
        mk("java-8:1", "java-8", "Object oriented Java collections streams"),
        mk("sales:0", "sales", "Sales negotiation and customer service"),
    ]
}

#[test]
fn write_then_search_lance_table() {
    let embedder = FakeEmbedder::new(64);
    let chunks = chunks();
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");

    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("lancedb");
    let written = tokio::runtime::Runtime::new()
        .expect("runtime")
        .block_on(async {
            let writer = LanceIndexWriter::new(&db_path, "chunks").await?;
            writer.write(&chunks, &embeddings).await
        })
        .expect("write");
    assert_eq!(written, 3);

    let index = LanceIndex::open(&db_path, "chunks").expect("open");
    assert_eq!(index.dim(), 64);
    assert_eq!(index.len().expect("len"), 3);

    let q = embedder.embed_query("Java programming").expect("q");
    let hits = index.search(&q, 2).expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].chunk.metadata.assessment_id.as_deref(), Some("java-8"));
    assert_eq!(hits[0].chunk.metadata.duration_minutes, Some(20));
    assert!(hits[0].similarity >= hits[1].similarity);
}

#[test]
fn missing_directory_or_table_is_index_not_found() {
    let tmp = TempDir::new().expect("tmp");
    let err = LanceIndex::open(&tmp.path().join("nope"), "chunks").err().expect("missing dir");
    assert!(is_index_not_found(&err));

    let err = LanceIndex::open(tmp.path(), "chunks").err().expect("missing table");
    assert!(is_index_not_found(&err));
}

#[test]
fn unreadable_metadata_row_is_kept_but_never_aggregated() {
    let embedder = FakeEmbedder::new(64);
    let chunks = chunks();
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");
    let broken_text = "Java programming broken row";
    let broken_vec = embedder.embed_query(broken_text).expect("broken vec");

    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("lancedb");
    tokio::runtime::Runtime::new()
        .expect("runtime")
        .block_on(async {
            LanceIndexWriter::new(&db_path, "chunks").await?.write(&chunks, &embeddings).await?;

            let schema = build_chunk_schema(64);
            let batch = RecordBatch::try_new(schema.clone(), vec![
                Arc::new(StringArray::from(vec!["broken:0"])),
                Arc::new(StringArray::from(vec![Some("java-8")])),
                Arc::new(StringArray::from(vec![broken_text])),
                Arc::new(StringArray::from(vec!["{not json"])),
                Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
                    vec![Some(broken_vec.iter().map(|&x| Some(x)).collect::<Vec<_>>())],
                    64,
                )),
            ])?;
            let db = open_db(&db_path.to_string_lossy()).await?;
            let table = db.open_table("chunks").execute().await?;
            table.add(Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema))).execute().await?;
            anyhow::Ok(())
        })
        .expect("write");

    let index = LanceIndex::open(&db_path, "chunks").expect("open");
    assert_eq!(index.len().expect("len"), 4);
    let hits = index.search(&broken_vec, 4).expect("search");
    assert_eq!(hits.len(), 4);
    let broken = hits.iter().find(|h| h.chunk.id == "broken:0").expect("broken row is returned");
    assert_eq!(broken.chunk.metadata.assessment_id(), None);
    assert_eq!(broken.chunk.content, broken_text);

    let weighted: Vec<ChunkHit> = hits.into_iter().map(|h| ChunkHit::new(h.chunk, h.similarity)).collect();
    let recs = aggregate(&weighted, 10);
    assert_eq!(recs.iter().map(|r| r.supporting_chunks).sum::<usize>(), 3);
    assert!(recs.iter().all(|r| r.evidence.iter().all(|e| e != broken_text)));
}
