//! Rebalancing results and their derivation from solved purchase quantities.

use crate::error::{RebalanceError, Result};
use crate::index::{deviation_pct, index_from_total_deviation};
use crate::snapshot::PortfolioSnapshot;

/// Slack allowed between total spend and available cash.
pub const BUDGET_TOLERANCE: f64 = 1e-6;

/// Before/after figures for one asset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetOutcome {
    pub asset: String,
    pub price: f64,
    /// Target weight (fraction)
    pub target_weight: f64,
    pub old_quantity: u64,
    /// Weight before trading (fraction)
    pub old_weight: f64,
    /// Whole shares to buy
    pub purchase: u64,
    /// True iff `purchase > 0`
    pub transacted: bool,
    /// `purchase * price`
    pub cost: f64,
    pub new_quantity: u64,
    pub new_value: f64,
    /// Weight after trading (fraction)
    pub new_weight: f64,
    /// `|old_weight - target_weight|` in percentage points
    pub deviation_before: f64,
    /// `|new_weight - target_weight|` in percentage points
    pub deviation_after: f64,
}

/// Complete outcome of one rebalance. Built once, never mutated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalancingResult {
    /// One entry per position, in snapshot order
    pub assets: Vec<AssetOutcome>,
    /// Cash that was available
    pub cash: f64,
    /// Total spent on purchases
    pub total_invested: f64,
    /// `total_invested / cash * 100`, 0 when cash is 0
    pub percent_invested: f64,
    /// Portfolio value before trading (cash excluded)
    pub old_total_value: f64,
    /// Portfolio value after trading (uninvested cash excluded)
    pub new_total_value: f64,
    /// Number of assets bought
    pub transactions: usize,
    pub index_before: f64,
    pub index_after: f64,
}

impl RebalancingResult {
    /// Derive every reporting field from whole-share purchases.
    ///
    /// Fails with [`RebalanceError::BudgetViolation`] if the purchases cost
    /// more than `cash`; the spend is never clamped.
    pub fn derive(snapshot: &PortfolioSnapshot, cash: f64, purchases: &[u64]) -> Result<Self> {
        if purchases.len() != snapshot.len() {
            return Err(RebalanceError::InfeasibleModel(format!(
                "solver returned {} quantities for {} assets",
                purchases.len(),
                snapshot.len()
            )));
        }

        let positions = snapshot.positions();
        let total_invested: f64 = positions
            .iter()
            .zip(purchases)
            .map(|(p, &q)| q as f64 * p.price)
            .sum();
        if total_invested > cash + BUDGET_TOLERANCE {
            return Err(RebalanceError::BudgetViolation {
                invested: total_invested,
                cash,
            });
        }

        let percent_invested = if cash > 0.0 {
            total_invested / cash * 100.0
        } else {
            0.0
        };

        let new_values: Vec<f64> = positions
            .iter()
            .zip(purchases)
            .map(|(p, &q)| p.value_after(q))
            .collect();
        let new_total_value: f64 = new_values.iter().sum();

        let assets: Vec<AssetOutcome> = positions
            .iter()
            .zip(purchases)
            .zip(snapshot.weights())
            .zip(&new_values)
            .map(|(((p, &purchase), &old_weight), &new_value)| {
                let new_weight = if new_total_value > 0.0 {
                    new_value / new_total_value
                } else {
                    0.0
                };
                AssetOutcome {
                    asset: p.asset.clone(),
                    price: p.price,
                    target_weight: p.target_weight,
                    old_quantity: p.quantity,
                    old_weight,
                    purchase,
                    transacted: purchase > 0,
                    cost: purchase as f64 * p.price,
                    new_quantity: p.quantity + purchase,
                    new_value,
                    new_weight,
                    deviation_before: deviation_pct(old_weight, p.target_weight),
                    deviation_after: deviation_pct(new_weight, p.target_weight),
                }
            })
            .collect();

        let index_before =
            index_from_total_deviation(assets.iter().map(|a| a.deviation_before).sum());
        let index_after = index_from_total_deviation(assets.iter().map(|a| a.deviation_after).sum());
        let transactions = assets.iter().filter(|a| a.transacted).count();

        Ok(Self {
            assets,
            cash,
            total_invested,
            percent_invested,
            old_total_value: snapshot.total_value(),
            new_total_value,
            transactions,
            index_before,
            index_after,
        })
    }

    /// Assets with a purchase, in snapshot order.
    pub fn orders(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets.iter().filter(|a| a.transacted)
    }

    /// True when nothing is bought.
    pub fn is_empty(&self) -> bool {
        self.transactions == 0
    }

    /// Cash left over after the purchases.
    pub fn uninvested(&self) -> f64 {
        (self.cash - self.total_invested).max(0.0)
    }

    /// `index_after - index_before`.
    pub fn improvement(&self) -> f64 {
        self.index_after - self.index_before
    }

    /// Post-trade share counts, in snapshot order.
    pub fn new_quantities(&self) -> Vec<u64> {
        self.assets.iter().map(|a| a.new_quantity).collect()
    }
}
