//! allocore-rebalancer: command-line front end for the allocore engine.
//!
//! Reads holdings from a CSV table, takes cash and the transaction cap from
//! flags, config defaults or prompts, solves the purchase model and prints
//! the recommended orders with a before/after comparison.

pub mod config;
pub mod error;
pub mod execution;
pub mod holdings;
pub mod report;
