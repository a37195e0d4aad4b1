use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use assessdb_cli::{init_tracing, load_settings};
use assessdb_core::config::expand_path;
use assessdb_core::ground_truth::{build_ground_truth, read_labeled_rows, save_ground_truth};

/// Turn a labeled `Query,Assessment_url` CSV into the ground-truth JSON file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Labeled rows CSV (defaults to `data.labeled_rows_path`).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output JSON (defaults to `data.ground_truth_path`).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = load_settings()?;

    let input = args.input.unwrap_or_else(|| expand_path(&settings.data.labeled_rows_path));
    let output = args.output.unwrap_or_else(|| expand_path(&settings.data.ground_truth_path));
    let entries = build_ground_truth(read_labeled_rows(&input)?);
    save_ground_truth(&output, &entries)?;
    println!("Wrote {} queries to {}", entries.len(), output.display());
    Ok(())
}
