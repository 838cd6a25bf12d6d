//! Parallel sweep over transaction caps.

use crate::engine::rebalance;
use crate::error::Result;
use crate::params::InvestmentParams;
use crate::result::RebalancingResult;
use crate::snapshot::PortfolioSnapshot;

/// Rebalance `snapshot` once per entry of `caps`, in parallel.
///
/// Every run uses `base` with `max_transactions` replaced by the cap. Runs are
/// independent, so an invalid cap only fails its own slot. Results come back
/// in the order of `caps`.
///
/// # Example
///
/// ```ignore
/// use allocore::{InvestmentParams, PortfolioSnapshot, Position, sweep_max_transactions};
///
/// let snapshot = PortfolioSnapshot::new(positions)?;
/// let base = InvestmentParams::new(1000.0, 0);
/// let caps: Vec<usize> = (0..=snapshot.len()).collect();
/// for (cap, result) in caps.iter().zip(sweep_max_transactions(&snapshot, &base, &caps)) {
///     println!("{cap}: {:.4}", result?.index_after);
/// }
/// ```
#[cfg(feature = "parallel")]
pub fn sweep_max_transactions(
    snapshot: &PortfolioSnapshot,
    base: &InvestmentParams,
    caps: &[usize],
) -> Vec<Result<RebalancingResult>> {
    use rayon::prelude::*;

    caps.par_iter()
        .map(|&cap| rebalance(snapshot, &base.clone().with_max_transactions(cap)))
        .collect()
}
