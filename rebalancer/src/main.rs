//! CLI entry point for the allocore rebalancer.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use allocore_rebalancer::config::Config;
use allocore_rebalancer::error::Error;
use allocore_rebalancer::execution::{self, RunOptions};
use allocore_rebalancer::holdings;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Buy-only portfolio rebalancer: whole-share purchases toward target weights")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute purchase orders and print the before/after comparison
    Run {
        /// Path to portfolio.csv
        portfolio: PathBuf,

        /// Cash available to invest
        #[arg(long)]
        cash: Option<f64>,

        /// Maximum number of assets to buy
        #[arg(long)]
        max_transactions: Option<usize>,

        /// Solver time limit in seconds (0 disables it)
        #[arg(long)]
        time_limit: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current weights against targets
    Show {
        /// Path to portfolio.csv
        portfolio: PathBuf,
    },

    /// Compare allocation quality for every transaction cap
    Sweep {
        /// Path to portfolio.csv
        portfolio: PathBuf,

        /// Cash available to invest
        #[arg(long)]
        cash: Option<f64>,

        /// Solver time limit in seconds (0 disables it)
        #[arg(long)]
        time_limit: Option<f64>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let interactive = std::io::stdin().is_terminal();

    let result = match cli.command {
        Command::Run {
            portfolio,
            cash,
            max_transactions,
            time_limit,
            json,
        } => holdings::load(&portfolio).and_then(|snapshot| {
            let opts = RunOptions {
                cash,
                max_transactions,
                time_limit_secs: time_limit,
                json,
                interactive,
            };
            execution::run(&config, &snapshot, &opts)
        }),
        Command::Show { portfolio } => {
            holdings::load(&portfolio).and_then(|snapshot| execution::show(&config, &snapshot))
        }
        Command::Sweep {
            portfolio,
            cash,
            time_limit,
        } => holdings::load(&portfolio).and_then(|snapshot| {
            let opts = RunOptions {
                cash,
                time_limit_secs: time_limit,
                interactive,
                ..Default::default()
            };
            execution::sweep(&config, &snapshot, &opts)
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(exit_code(&e));
    }
}

fn exit_code(e: &Error) -> i32 {
    if e.is_validation() { 2 } else { 1 }
}
