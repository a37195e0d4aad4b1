use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use assessdb_cli::{build_recommender, init_tracing, load_settings};

/// Recommend assessments for a free-text hiring need.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The job description or hiring query.
    query: String,

    /// Number of assessments to return (defaults to `recommend.default_top_k`).
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Query an in-memory snapshot instead of the LanceDB table.
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;
    let recommender = build_recommender(&settings, args.memory.as_deref())?;

    let top_k = args.top_k.unwrap_or(settings.recommend.default_top_k);
    let results = recommender.recommend(&args.query, top_k)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    if results.is_empty() {
        println!("No recommendations for \"{}\"", args.query);
        return Ok(());
    }
    println!("Top {} for \"{}\":", results.len(), args.query);
    for (i, r) in results.iter().enumerate() {
        let duration = r.duration_minutes.map_or_else(|| "-".to_string(), |d| format!("{d} min"));
        println!("{:>2}. {:<40} score={:.3}  duration={}", i + 1, r.name, r.match_score, duration);
        if !r.test_types.is_empty() {
            println!("    types:  {}", r.test_types.join(", "));
        }
        if !r.job_levels.is_empty() {
            println!("    levels: {}", r.job_levels.join(", "));
        }
    }
    Ok(())
}
