//! Command orchestration: resolve parameters → rebalance → render.

use allocore::{
    InvestmentParams, PortfolioSnapshot, RebalanceError, RebalancingResult, Rebalancer,
    sweep_max_transactions,
};
use log::{info, warn};

use crate::config::{Config, time_limit_from_secs};
use crate::error::{Error, Result};
use crate::report::{ResultReport, SnapshotReport, SweepReport};

/// Options for a rebalance run. `None` fields fall back to the config
/// defaults, then to an interactive prompt.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cash: Option<f64>,
    pub max_transactions: Option<usize>,
    /// Seconds; 0 disables the limit
    pub time_limit_secs: Option<f64>,
    pub json: bool,
    /// Whether prompting on stdin is allowed
    pub interactive: bool,
}

/// Build engine parameters from flags, config defaults and prompts.
pub fn resolve_params(
    config: &Config,
    snapshot: &PortfolioSnapshot,
    opts: &RunOptions,
) -> Result<InvestmentParams> {
    let cash = match opts.cash.or(config.defaults.cash) {
        Some(cash) => cash,
        None if opts.interactive => prompt_cash(&config.report.currency)?,
        None => return Err(missing("cash amount", "--cash", "defaults.cash")),
    };

    let max_transactions = match opts.max_transactions.or(config.defaults.max_transactions) {
        Some(n) => n,
        None if opts.interactive => prompt_max_transactions(snapshot.len())?,
        None => {
            return Err(missing(
                "maximum number of transactions",
                "--max-transactions",
                "defaults.max_transactions",
            ));
        }
    };

    let mut params = InvestmentParams::new(cash, max_transactions).with_big_m(config.big_m());
    params.time_limit = match opts.time_limit_secs {
        Some(secs) => {
            if !secs.is_finite() || secs < 0.0 {
                return Err(RebalanceError::InvalidParameters(format!(
                    "time limit must be a non-negative number of seconds, got {secs}"
                ))
                .into());
            }
            time_limit_from_secs(secs)
        }
        None => config.time_limit(),
    };

    Ok(params)
}

fn missing(what: &str, flag: &str, key: &str) -> Error {
    Error::Config(format!("{what} not given; pass {flag} or set {key} in the config"))
}

fn prompt_cash(currency: &str) -> Result<f64> {
    dialoguer::Input::<f64>::new()
        .with_prompt(format!("Please enter the total amount to invest ({currency})"))
        .validate_with(|v: &f64| -> std::result::Result<(), &str> {
            if v.is_finite() && *v >= 0.0 {
                Ok(())
            } else {
                Err("the amount must be a non-negative number")
            }
        })
        .interact_text()
        .map_err(|e| Error::Prompt(e.to_string()))
}

fn prompt_max_transactions(positions: usize) -> Result<usize> {
    dialoguer::Input::<usize>::new()
        .with_prompt("Please enter the maximum number of transactions")
        .validate_with(move |n: &usize| -> std::result::Result<(), String> {
            if *n <= positions {
                Ok(())
            } else {
                Err(format!("at most {positions} transactions are possible"))
            }
        })
        .interact_text()
        .map_err(|e| Error::Prompt(e.to_string()))
}

/// Resolve parameters and solve, without printing.
pub fn plan(
    config: &Config,
    snapshot: &PortfolioSnapshot,
    opts: &RunOptions,
) -> Result<RebalancingResult> {
    let params = resolve_params(config, snapshot, opts)?;
    info!(
        "rebalancing {} positions with {:.2} {} and at most {} transactions",
        snapshot.len(),
        params.cash,
        config.report.currency,
        params.max_transactions
    );
    Ok(Rebalancer::new().rebalance(snapshot, &params)?)
}

/// Text or JSON rendering of a result.
pub fn render_result(config: &Config, result: &RebalancingResult, json: bool) -> Result<String> {
    if json {
        let mut text = serde_json::to_string_pretty(result)?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(ResultReport::new(result, &config.report.currency).to_string())
    }
}

/// Execute a full rebalance run and print the report.
pub fn run(config: &Config, snapshot: &PortfolioSnapshot, opts: &RunOptions) -> Result<()> {
    let result = plan(config, snapshot, opts)?;
    if !opts.json {
        println!();
    }
    print!("{}", render_result(config, &result, opts.json)?);
    Ok(())
}

/// Print current weights, targets and allocation index.
pub fn show(config: &Config, snapshot: &PortfolioSnapshot) -> Result<()> {
    let sum = snapshot.target_sum();
    if (sum - 1.0).abs() > allocore::WEIGHT_TOLERANCE {
        warn!("target allocations sum to {:.4}%, not 100%", sum * 100.0);
    }
    print!("{}", SnapshotReport::new(snapshot, &config.report.currency));
    Ok(())
}

/// Rebalance once per transaction cap `0..=n`.
pub fn sweep_results(
    config: &Config,
    snapshot: &PortfolioSnapshot,
    opts: &RunOptions,
) -> Result<(Vec<usize>, Vec<allocore::Result<RebalancingResult>>)> {
    // The cap is swept, so only cash has to be resolved.
    let opts = RunOptions {
        max_transactions: Some(0),
        ..opts.clone()
    };
    let base = resolve_params(config, snapshot, &opts)?;
    // Fail fast on inputs every cap would reject.
    allocore::validate(snapshot, &base)?;

    let caps: Vec<usize> = (0..=snapshot.len()).collect();
    let results = sweep_max_transactions(snapshot, &base, &caps);
    Ok((caps, results))
}

/// Print allocation quality for every transaction cap.
pub fn sweep(config: &Config, snapshot: &PortfolioSnapshot, opts: &RunOptions) -> Result<()> {
    let (caps, results) = sweep_results(config, snapshot, opts)?;
    print!(
        "{}",
        SweepReport {
            caps: &caps,
            results: &results,
            currency: &config.report.currency,
        }
    );
    Ok(())
}
