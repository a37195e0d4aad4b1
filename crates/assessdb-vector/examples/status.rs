use std::path::PathBuf;

use assessdb_core::traits::EmbeddingIndex;
use assessdb_vector::LanceIndex;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let db_path = args.next().map_or_else(|| PathBuf::from("data/indexes/lancedb"), PathBuf::from);
    let table = args.next().unwrap_or_else(|| "assessment_chunks".to_string());
    let index = LanceIndex::open(&db_path, &table)?;
    println!("{}: table={} rows={} dim={}", db_path.display(), index.table_name(), index.len()?, index.dim());
    Ok(())
}
