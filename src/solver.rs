//! Solver seam and the default `good_lp` backend.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::warn;

use crate::model::PurchaseModel;

/// Outcome of one solve attempt, before the engine interprets it.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveStatus {
    /// Proven optimal; one (possibly fractional-noisy) purchase value per asset.
    Optimal(Vec<f64>),
    /// The time limit elapsed before a solution was found.
    TimeLimit,
    Infeasible,
    Unbounded,
    /// Any other solver failure.
    Failed(String),
}

/// Something that can solve a [`PurchaseModel`].
///
/// The engine only depends on this trait; [`GoodLpSolver`] is the default.
pub trait Solver: Send + Sync {
    /// Solve `model`, giving up after `time_limit` if one is set.
    fn solve(&self, model: &PurchaseModel, time_limit: Option<Duration>) -> SolveStatus;
}

/// `good_lp` with the pure-Rust `microlp` backend.
///
/// `microlp` has no time-limit parameter, so a limit is enforced by solving
/// on a worker thread and waiting at most `time_limit` for its answer. A
/// worker that overruns is detached; it runs to completion in the
/// background and its answer is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoodLpSolver;

impl Solver for GoodLpSolver {
    fn solve(&self, model: &PurchaseModel, time_limit: Option<Duration>) -> SolveStatus {
        let Some(limit) = time_limit else {
            return model.solve_milp();
        };

        let (tx, rx) = mpsc::channel();
        let owned = model.clone();
        let spawned = thread::Builder::new()
            .name("allocore-solver".into())
            .spawn(move || {
                // Receiver is gone if the caller already timed out.
                let _ = tx.send(owned.solve_milp());
            });
        if let Err(e) = spawned {
            return SolveStatus::Failed(format!("failed to start solver thread: {e}"));
        }

        match rx.recv_timeout(limit) {
            Ok(status) => status,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "solver exceeded {:.1}s time limit on {} assets",
                    limit.as_secs_f64(),
                    model.len()
                );
                SolveStatus::TimeLimit
            }
            Err(RecvTimeoutError::Disconnected) => {
                SolveStatus::Failed("solver thread exited without a result".into())
            }
        }
    }
}
