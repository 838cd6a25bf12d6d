//! The rebalancing MILP.
//!
//! Per asset `i` the model has four decision variables:
//!
//! | Variable        | Domain            | Meaning                               |
//! |-----------------|-------------------|---------------------------------------|
//! | `purchase[i]`   | integer, `[0,M_i]`| shares to buy                         |
//! | `transacted[i]` | binary            | 1 iff at least one share is bought    |
//! | `dev_plus[i]`   | continuous, `>=0` | overweight part of the scaled gap     |
//! | `dev_minus[i]`  | continuous, `>=0` | underweight part of the scaled gap    |
//!
//! With `T = current total value + cash`, the objective is
//! `min Σ (dev_plus[i] + dev_minus[i])` subject to
//!
//! 1. budget: `Σ price[i] * purchase[i] <= cash`
//! 2. transaction cap: `Σ transacted[i] <= max_transactions`
//! 3. linking: `transacted[i] <= purchase[i] <= M_i * transacted[i]`
//! 4. deviation: `value[i] + price[i] * purchase[i] - T * target[i] = T * (dev_plus[i] - dev_minus[i])`
//!
//! Both deviation parts are penalized and only their difference is
//! constrained, so at an optimum at most one of them is nonzero and their
//! sum is the absolute gap `|new_value[i] / T - target[i]|`.

use good_lp::solvers::microlp::microlp;
use good_lp::{Expression, ResolutionError, Solution, SolverModel, Variable, variable, variables};
use log::trace;

use crate::params::InvestmentParams;
use crate::snapshot::PortfolioSnapshot;
use crate::solver::SolveStatus;

/// Solver-independent description of one rebalancing problem.
///
/// Plain owned data so it can be handed to a worker thread or to a
/// different [`Solver`](crate::Solver) implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseModel {
    /// Price per share
    pub prices: Vec<f64>,
    /// Current market value per asset
    pub current_values: Vec<f64>,
    /// Target weight per asset (fractions summing to 1)
    pub target_weights: Vec<f64>,
    /// Big-M bound per asset, also the upper bound of `purchase[i]`
    pub upper_bounds: Vec<f64>,
    /// Cash available
    pub cash: f64,
    /// Transaction cap
    pub max_transactions: usize,
    /// Current total value plus cash
    pub total_target_value: f64,
}

impl PurchaseModel {
    /// Build the model data for `snapshot` under `params`.
    ///
    /// Does not validate; the engine validates before calling this.
    pub fn build(snapshot: &PortfolioSnapshot, params: &InvestmentParams) -> Self {
        let positions = snapshot.positions();
        Self {
            prices: positions.iter().map(|p| p.price).collect(),
            current_values: snapshot.values().to_vec(),
            target_weights: snapshot.target_weights(),
            upper_bounds: positions
                .iter()
                .map(|p| params.big_m.bound(params.cash, p.price))
                .collect(),
            cash: params.cash,
            max_transactions: params.max_transactions,
            total_target_value: snapshot.total_value() + params.cash,
        }
    }

    /// Number of assets.
    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Objective value of an integer purchase vector:
    /// `Σ |value[i] + price[i] * purchase[i] - T * target[i]| / T`.
    ///
    /// Returns 0 when `T` is 0.
    pub fn objective_value(&self, purchases: &[u64]) -> f64 {
        let t = self.total_target_value;
        if t <= 0.0 {
            return 0.0;
        }
        (0..self.len())
            .map(|i| {
                let shares = purchases.get(i).copied().unwrap_or(0) as f64;
                let new_value = self.current_values[i] + self.prices[i] * shares;
                (new_value - t * self.target_weights[i]).abs() / t
            })
            .sum()
    }

    /// True if `purchases` satisfies the budget, cap and bound constraints.
    pub fn is_feasible(&self, purchases: &[u64]) -> bool {
        if purchases.len() != self.len() {
            return false;
        }
        let spend: f64 = purchases
            .iter()
            .zip(&self.prices)
            .map(|(&q, &p)| q as f64 * p)
            .sum();
        let transactions = purchases.iter().filter(|&&q| q > 0).count();
        let within_bounds = purchases
            .iter()
            .zip(&self.upper_bounds)
            .all(|(&q, &m)| q as f64 <= m);
        spend <= self.cash + crate::result::BUDGET_TOLERANCE
            && transactions <= self.max_transactions
            && within_bounds
    }

    /// Formulate the MILP with `good_lp` and solve it with the bundled
    /// `microlp` backend. Blocks until the solver returns.
    pub fn solve_milp(&self) -> SolveStatus {
        let n = self.len();
        let t = self.total_target_value;

        let mut vars = variables!();
        let mut purchase: Vec<Variable> = Vec::with_capacity(n);
        let mut transacted: Vec<Variable> = Vec::with_capacity(n);
        let mut dev_plus: Vec<Variable> = Vec::with_capacity(n);
        let mut dev_minus: Vec<Variable> = Vec::with_capacity(n);
        let mut objective = Expression::with_capacity(n * 2);

        for &upper in &self.upper_bounds {
            purchase.push(vars.add(variable().integer().min(0.0).max(upper)));
            transacted.push(vars.add(variable().binary()));

            let plus = vars.add(variable().min(0.0));
            let minus = vars.add(variable().min(0.0));
            objective.add_mul(1.0, plus);
            objective.add_mul(1.0, minus);
            dev_plus.push(plus);
            dev_minus.push(minus);
        }

        let mut problem = vars.minimise(objective).using(microlp);

        // 1. Budget
        let mut spend = Expression::with_capacity(n);
        for (&shares, &price) in purchase.iter().zip(&self.prices) {
            spend.add_mul(price, shares);
        }
        problem = problem.with(spend.leq(self.cash));

        // 2. Transaction cap
        let mut transactions = Expression::with_capacity(n);
        for &flag in &transacted {
            transactions.add_mul(1.0, flag);
        }
        problem = problem.with(transactions.leq(self.max_transactions as f64));

        // 3. Linking: transacted <= purchase <= M * transacted
        for ((&shares, &flag), &upper) in purchase.iter().zip(&transacted).zip(&self.upper_bounds) {
            problem = problem.with((shares - flag).geq(0.0));
            problem = problem.with((shares - upper * flag).leq(0.0));
        }

        // 4. Deviation: price * purchase - T * (plus - minus) = T * target - value
        for i in 0..n {
            let gap = self.prices[i] * purchase[i] - t * dev_plus[i] + t * dev_minus[i];
            let rhs = t * self.target_weights[i] - self.current_values[i];
            problem = problem.with(gap.eq(rhs));
        }

        trace!("solving rebalancing MILP: {n} assets, {} variables", n * 4);

        match problem.solve() {
            Ok(solution) => {
                SolveStatus::Optimal(purchase.iter().map(|&v| solution.value(v)).collect())
            }
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(e) => SolveStatus::Failed(e.to_string()),
        }
    }
}
