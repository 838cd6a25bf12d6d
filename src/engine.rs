//! The rebalancing engine: validate, formulate, solve, derive.

use log::{debug, info, warn};

use crate::error::{RebalanceError, Result};
use crate::model::PurchaseModel;
use crate::params::{BigM, InvestmentParams};
use crate::result::RebalancingResult;
use crate::snapshot::PortfolioSnapshot;
use crate::solver::{GoodLpSolver, SolveStatus, Solver};

/// Allowed distance of the target-weight sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Rebalancing engine over a [`Solver`].
///
/// Holds no state between calls; one engine can serve any number of
/// snapshots, from several threads if the solver allows it.
#[derive(Clone, Debug, Default)]
pub struct Rebalancer<S = GoodLpSolver> {
    solver: S,
}

impl Rebalancer {
    /// Engine backed by [`GoodLpSolver`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Solver> Rebalancer<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Compute buy-only orders that move `snapshot` toward its targets.
    ///
    /// Returns a complete result or an error; never a partial result.
    pub fn rebalance(
        &self,
        snapshot: &PortfolioSnapshot,
        params: &InvestmentParams,
    ) -> Result<RebalancingResult> {
        validate(snapshot, params)?;

        let model = PurchaseModel::build(snapshot, params);
        if model.total_target_value <= 0.0 {
            // Nothing held and nothing to invest: the only solution is to buy nothing.
            debug!("portfolio and cash are both empty, skipping solve");
            let purchases = vec![0; snapshot.len()];
            return RebalancingResult::derive(snapshot, params.cash, &purchases);
        }

        debug!(
            "rebalancing {} assets: cash={:.2}, max_transactions={}, time_limit={:?}",
            model.len(),
            params.cash,
            params.max_transactions,
            params.time_limit
        );

        let values = match self.solver.solve(&model, params.time_limit) {
            SolveStatus::Optimal(values) => values,
            SolveStatus::TimeLimit => {
                let limit_secs = params.time_limit.map_or(0.0, |d| d.as_secs_f64());
                return Err(RebalanceError::SolverTimeout { limit_secs });
            }
            SolveStatus::Infeasible => {
                warn!("rebalancing model reported infeasible");
                return Err(RebalanceError::InfeasibleModel("model is infeasible".into()));
            }
            SolveStatus::Unbounded => {
                warn!("rebalancing model reported unbounded");
                return Err(RebalanceError::InfeasibleModel("model is unbounded".into()));
            }
            SolveStatus::Failed(msg) => {
                warn!("solver failed: {msg}");
                return Err(RebalanceError::InfeasibleModel(msg));
            }
        };

        let purchases = whole_shares(&values)?;
        let result = RebalancingResult::derive(snapshot, params.cash, &purchases)?;

        info!(
            "rebalance solved: {} transactions, {:.2} invested ({:.2}%), index {:.4} -> {:.4}",
            result.transactions,
            result.total_invested,
            result.percent_invested,
            result.index_before,
            result.index_after
        );

        Ok(result)
    }
}

/// Rebalance with the default [`GoodLpSolver`].
pub fn rebalance(
    snapshot: &PortfolioSnapshot,
    params: &InvestmentParams,
) -> Result<RebalancingResult> {
    Rebalancer::new().rebalance(snapshot, params)
}

/// Check every precondition of [`rebalance`] without solving.
pub fn validate(snapshot: &PortfolioSnapshot, params: &InvestmentParams) -> Result<()> {
    let sum = snapshot.target_sum();
    if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(RebalanceError::InvalidAllocation {
            sum_pct: sum * 100.0,
        });
    }

    if params.max_transactions > snapshot.len() {
        return Err(RebalanceError::InvalidParameters(format!(
            "max transactions ({}) exceeds the number of positions ({})",
            params.max_transactions,
            snapshot.len()
        )));
    }

    if !params.cash.is_finite() || params.cash < 0.0 {
        return Err(RebalanceError::InvalidParameters(format!(
            "cash amount must be a non-negative number, got {}",
            params.cash
        )));
    }

    if params.time_limit.is_some_and(|limit| limit.is_zero()) {
        return Err(RebalanceError::InvalidParameters(
            "solver time limit must be positive".into(),
        ));
    }

    if let BigM::Global(m) = params.big_m {
        if !m.is_finite() || m < 1.0 {
            return Err(RebalanceError::InvalidParameters(format!(
                "big-M must be a finite number >= 1, got {m}"
            )));
        }
    }

    Ok(())
}

/// Round solver output to whole shares, rejecting values that are not
/// plausibly non-negative integers.
fn whole_shares(values: &[f64]) -> Result<Vec<u64>> {
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() || v < -0.5 {
                return Err(RebalanceError::InfeasibleModel(format!(
                    "solver returned an invalid purchase quantity: {v}"
                )));
            }
            Ok(v.round().max(0.0) as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::position::Position;

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot::new(vec![
            Position::new("A", 10, 100.0, 0.5),
            Position::new("B", 5, 200.0, 0.3),
            Position::new("C", 8, 150.0, 0.2),
        ])
        .unwrap()
    }

    #[test]
    fn validate_accepts_reference() {
        assert!(validate(&snapshot(), &InvestmentParams::new(1000.0, 3)).is_ok());
    }

    #[test]
    fn validate_weight_sum() {
        let snap = PortfolioSnapshot::new(vec![
            Position::new("A", 1, 10.0, 0.5),
            Position::new("B", 1, 10.0, 0.49),
        ])
        .unwrap();
        let err = validate(&snap, &InvestmentParams::new(100.0, 1)).unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidAllocation { .. }));
    }

    #[test]
    fn validate_weight_sum_within_tolerance() {
        let snap = PortfolioSnapshot::new(vec![
            Position::new("A", 1, 10.0, 0.5000004),
            Position::new("B", 1, 10.0, 0.5),
        ])
        .unwrap();
        assert!(validate(&snap, &InvestmentParams::new(100.0, 1)).is_ok());
    }

    #[test]
    fn validate_transaction_cap() {
        let err = validate(&snapshot(), &InvestmentParams::new(1000.0, 4)).unwrap_err();
        assert!(matches!(err, RebalanceError::InvalidParameters(_)));
    }

    #[test]
    fn validate_cash() {
        assert!(validate(&snapshot(), &InvestmentParams::new(-1.0, 3)).is_err());
        assert!(validate(&snapshot(), &InvestmentParams::new(f64::NAN, 3)).is_err());
    }

    #[test]
    fn validate_time_limit() {
        let params = InvestmentParams::new(1000.0, 3).with_time_limit(Duration::ZERO);
        assert!(validate(&snapshot(), &params).is_err());
    }

    #[test]
    fn validate_global_big_m() {
        let params = InvestmentParams::new(1000.0, 3).with_big_m(BigM::Global(0.5));
        assert!(validate(&snapshot(), &params).is_err());
        let params = InvestmentParams::new(1000.0, 3).with_big_m(BigM::Global(f64::INFINITY));
        assert!(validate(&snapshot(), &params).is_err());
    }

    #[test]
    fn whole_shares_rounds_noise() {
        assert_eq!(
            whole_shares(&[2.9999999, 0.0000001, -0.0000001]).unwrap(),
            vec![3, 0, 0]
        );
        assert!(whole_shares(&[f64::NAN]).is_err());
        assert!(whole_shares(&[-3.0]).is_err());
    }

    #[test]
    fn empty_portfolio_and_cash_skip_solver() {
        let snap = PortfolioSnapshot::new(vec![
            Position::new("A", 0, 10.0, 0.5),
            Position::new("B", 0, 20.0, 0.5),
        ])
        .unwrap();
        let r = rebalance(&snap, &InvestmentParams::new(0.0, 2)).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.total_invested, 0.0);
    }
}
