//! # allocore
//!
//! Buy-only portfolio rebalancing as a mixed-integer linear program.
//!
//! Given current holdings, prices, target weights, a cash amount and a cap on
//! the number of transactions, the engine picks whole-share purchases that
//! bring the portfolio as close as possible to its targets, measured as the
//! sum of absolute weight deviations.
//!
//! ## Features
//!
//! - **Whole shares only**: integer purchase variables, no fractional orders
//! - **Transaction cap**: binary indicators limit how many assets are bought
//! - **Budget**: total spend never exceeds the available cash
//! - **Before/after report**: new weights, deviations and an allocation index
//! - **Time limit**: optional wall-clock budget for the solver
//!
//! ## Quick Start
//!
//! ```
//! use allocore::{InvestmentParams, PortfolioSnapshot, Position, rebalance};
//!
//! let snapshot = PortfolioSnapshot::new(vec![
//!     Position::from_percent("A", 10, 100.0, 50.0),
//!     Position::from_percent("B", 5, 200.0, 30.0),
//!     Position::from_percent("C", 8, 150.0, 20.0),
//! ])
//! .unwrap();
//!
//! let result = rebalance(&snapshot, &InvestmentParams::new(1000.0, 3)).unwrap();
//!
//! assert!(result.total_invested <= 1000.0);
//! assert!(result.transactions <= 3);
//! assert!(result.index_after > result.index_before);
//! ```
//!
//! ## Allocation Index
//!
//! `1 - Σ|weight - target| / 200` with weights in percent; 1 is a perfect
//! match:
//!
//! ```
//! use allocore::allocation_index;
//!
//! let idx = allocation_index(&[0.3125, 0.3125, 0.375], &[0.5, 0.3, 0.2]);
//! assert!((idx - 0.8125).abs() < 1e-12);
//! ```
//!
//! ## Solvers
//!
//! The model is described by a solver-independent [`PurchaseModel`] and
//! solved through the [`Solver`] trait. [`GoodLpSolver`] (the default) uses
//! `good_lp` with its pure-Rust `microlp` backend.

mod engine;
mod error;
pub mod index;
pub mod model;
mod params;
mod position;
mod result;
mod snapshot;
pub mod solver;
#[cfg(feature = "parallel")]
pub mod sweep;

// Re-export public API
pub use engine::{Rebalancer, WEIGHT_TOLERANCE, rebalance, validate};
pub use error::{RebalanceError, Result};
pub use index::{allocation_index, deviation_pct};
pub use model::PurchaseModel;
pub use params::{BigM, DEFAULT_TIME_LIMIT, InvestmentParams};
pub use position::Position;
pub use result::{AssetOutcome, BUDGET_TOLERANCE, RebalancingResult};
pub use snapshot::PortfolioSnapshot;
pub use solver::{GoodLpSolver, SolveStatus, Solver};
#[cfg(feature = "parallel")]
pub use sweep::sweep_max_transactions;
