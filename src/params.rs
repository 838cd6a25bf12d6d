//! Investment parameters for a single rebalance.

use std::time::Duration;

/// Solver time budget used by the command-line front end when none is given.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

/// Upper bound `M` linking a purchase quantity to its transaction indicator
/// (`purchase[i] <= M_i * transacted[i]`).
///
/// `M` must be at least the largest share count the budget allows, or
/// feasible purchases get cut off. A needlessly large `M` slows the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BigM {
    /// `M_i = ceil(cash / price_i)`, the tightest bound implied by the budget.
    #[default]
    PerAsset,
    /// One constant for every asset.
    Global(f64),
}

impl BigM {
    /// Textbook global constant, `1e6`.
    pub const REFERENCE: BigM = BigM::Global(1e6);

    /// Bound for an asset with the given price.
    pub fn bound(&self, cash: f64, price: f64) -> f64 {
        match *self {
            BigM::PerAsset => (cash / price).ceil().max(0.0),
            BigM::Global(m) => m,
        }
    }
}

/// Cash, transaction cap and solver settings for one rebalance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvestmentParams {
    /// Cash available to invest
    pub cash: f64,
    /// Maximum number of assets bought (one transaction per asset)
    pub max_transactions: usize,
    /// Wall-clock budget for the solver; `None` waits indefinitely
    pub time_limit: Option<Duration>,
    /// Linking-constraint bound
    pub big_m: BigM,
}

impl InvestmentParams {
    /// Parameters with no time limit and per-asset big-M bounds.
    pub fn new(cash: f64, max_transactions: usize) -> Self {
        Self {
            cash,
            max_transactions,
            time_limit: None,
            big_m: BigM::default(),
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self
    }
}
