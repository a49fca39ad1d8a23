//! Megaverse reconciliation CLI.
//!
//! Commands:
//! - reconcile: run one reconciliation pass against the goal map
//! - show: fetch and render the current (or goal) grid
//! - clear: delete every occupant, leaving an all-space board

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use megaverse_reconciler::api::MegaverseClient;
use megaverse_reconciler::config::{ReconcilerConfig, DEFAULT_BASE_URL};
use megaverse_reconciler::reconciler::{CancelToken, Reconciler};
use megaverse_reconciler::report::ReconcileReport;

#[derive(Parser)]
#[command(name = "megaverse")]
#[command(version)]
#[command(about = "Reconciles a megaverse grid with its goal map")]
struct Cli {
    /// Candidate identifier for the target grid
    #[arg(long, env = "CANDIDATE_ID")]
    candidate_id: String,

    /// Base URL of the challenge API
    #[arg(long, env = "MEGAVERSE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Maximum attempts per remote call
    #[arg(long, default_value = "5")]
    max_attempts: u32,

    /// Minimum delay between remote calls, in milliseconds
    #[arg(long, default_value = "500")]
    pacing_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass toward the goal map
    Reconcile,

    /// Fetch and print a grid
    Show {
        /// Show the goal map instead of the current one
        #[arg(long)]
        goal: bool,
    },

    /// Delete every occupant on the board
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let mut config = ReconcilerConfig::new(cli.candidate_id);
    config.base_url = cli.base_url;
    config.retry.max_attempts = cli.max_attempts;
    config.pacing.min_gap_ms = cli.pacing_ms;

    let client = Arc::new(MegaverseClient::new(&config));
    let cancel = CancelToken::new();

    // First Ctrl-C stops the pass between edits; the process then exits
    // normally with a partial summary.
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing current edit");
            signal_cancel.cancel();
        }
    });

    let mut reconciler = Reconciler::new(client, &config, cancel);

    match cli.command {
        Commands::Reconcile => {
            let current = reconciler.fetch_current().await?;
            let goal = reconciler.fetch_goal().await?;
            println!("Current grid:\n{}", current);
            println!("Goal grid:\n{}", goal);

            let report = reconciler.run().await?;
            print_report(&report);
        }

        Commands::Show { goal } => {
            let grid = if goal {
                reconciler.fetch_goal().await?
            } else {
                reconciler.fetch_current().await?
            };
            println!(
                "{} grid ({}x{}, {} occupied):",
                if goal { "Goal" } else { "Current" },
                grid.rows(),
                grid.columns(),
                grid.occupied()
            );
            println!("{}", grid);
        }

        Commands::Clear => {
            let report = reconciler.run_clear().await?;
            print_report(&report);
        }
    }

    Ok(())
}

/// Print the pass summary. Per-edit failures are reported here rather than
/// through the exit status: partial completion is an expected steady state
/// once retries are exhausted.
fn print_report(report: &ReconcileReport) {
    println!("\n=== Pass Summary ===");
    print!("{}", report);
    if report.is_clean() {
        println!("Grid matches the goal map.");
    }
}
