use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use assessdb_cli::{build_recommender, init_tracing, load_settings};
use assessdb_core::config::expand_path;
use assessdb_eval::{load_ground_truth, Evaluator};

/// Recall@5, Recall@10 and MRR of the recommender over labeled queries.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ground-truth JSON (defaults to `data.ground_truth_path`).
    #[arg(short, long)]
    ground_truth: Option<PathBuf>,

    /// Evaluate against an in-memory snapshot instead of the LanceDB table.
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Also list the first relevant rank of every query.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;

    let gt_path = args.ground_truth.unwrap_or_else(|| expand_path(&settings.data.ground_truth_path));
    let entries = load_ground_truth(&gt_path)?;
    let recommender = build_recommender(&settings, args.memory.as_deref())?;
    let report = Evaluator::new(&recommender, entries)?.with_mrr_depth(settings.eval.mrr_depth).report()?;

    if args.json {
        let shown = if args.verbose { report.clone() } else { report.rounded() };
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }
    if args.verbose {
        for o in &report.outcomes {
            let rank = o.first_hit_rank.map_or_else(|| "miss".to_string(), |r| format!("#{r}"));
            println!("{rank:>5}  {}", o.query);
        }
        println!();
    }
    println!("{report}");
    Ok(())
}
