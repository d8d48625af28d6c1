//! Run the balanced-rectangle search over a range of (rows, symbols) targets.
//!
//! Usage: cargo run --release --example sweep -- [--min-rows 2] [--max-symbols 12] [--seed 0]
//!
//! Example:
//!   cargo run --release --example sweep -- --max-symbols 8 --seed 42

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use latin_balance::{ResultTable, SearchParams, Sweep, SweepParams};

#[derive(Parser)]
#[command(name = "sweep")]
#[command(about = "Search for balanced Latin rectangles")]
struct Cli {
    /// Smallest number of rows
    #[arg(long, default_value = "2")]
    min_rows: usize,

    /// Largest number of symbols
    #[arg(long, default_value = "12")]
    max_symbols: usize,

    /// Base random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Chain-repair cycles per target
    #[arg(long, default_value = "120")]
    cycles: usize,

    /// Column-swap proposals per cycle
    #[arg(long, default_value = "35")]
    swaps: usize,

    /// Cycles between restarts
    #[arg(long, default_value = "40")]
    budget: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = SweepParams {
        min_rows: cli.min_rows,
        max_symbols: cli.max_symbols,
        seed: cli.seed,
        search: SearchParams {
            outer_cycles: cli.cycles,
            perturbations_per_cycle: cli.swaps,
            stagnation_budget: cli.budget,
        },
    };
    info!(?params, "starting sweep");

    let mut sweep = Sweep::new(params, ResultTable::new());
    for (target, outcome) in sweep.by_ref() {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                eprintln!("k={} n={}: {}", target.rows, target.symbols, err);
                continue;
            }
        };
        println!(
            "k={} n={} score={:.6} cycles={} restarts={}",
            target.rows, target.symbols, outcome.score, outcome.cycles, outcome.restarts
        );
        for row in outcome.best.to_rows() {
            let line: Vec<String> = row.iter().map(u8::to_string).collect();
            println!("  {}", line.join(" "));
        }
    }

    println!();
    println!("=== Imbalance by (rows, symbols) ===");
    let table = sweep.into_table();
    for row in table.score_table(cli.max_symbols + 1) {
        let line: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        println!("{}", line.join(","));
    }

    Ok(())
}
