//! Errors returned by the rebalancing engine.

/// Every way a rebalance can fail.
///
/// Validation variants are raised before any solver work; solver variants
/// after the solve attempt. No variant carries a partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RebalanceError {
    /// Target weights do not sum to 100%.
    #[error("the sum of the target allocations must equal 100% (got {sum_pct:.4}%)")]
    InvalidAllocation { sum_pct: f64 },

    /// Out-of-range or inconsistent inputs.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The solver did not produce a solution before the time limit elapsed.
    #[error("optimization did not complete within the time limit ({limit_secs:.1}s)")]
    SolverTimeout { limit_secs: f64 },

    /// The solver reported infeasible, unbounded, or another non-optimal status.
    #[error("no optimal solution found ({0}); check the constraints and data")]
    InfeasibleModel(String),

    /// Rounded purchases cost more than the available cash.
    #[error("total invested ({invested:.2}) exceeds the available funds ({cash:.2})")]
    BudgetViolation { invested: f64, cash: f64 },
}

impl RebalanceError {
    /// True for errors raised before the solver ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RebalanceError::InvalidAllocation { .. } | RebalanceError::InvalidParameters(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RebalanceError>;
