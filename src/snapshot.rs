//! Immutable portfolio snapshots.

use rustc_hash::FxHashSet;

use crate::error::{RebalanceError, Result};
use crate::index::allocation_index;
use crate::position::Position;

/// The positions of a portfolio plus values and weights derived once at
/// construction.
///
/// A snapshot is never mutated. Rebalancing produces a
/// [`RebalancingResult`](crate::RebalancingResult); use
/// [`with_quantities`](Self::with_quantities) to roll it into a new snapshot.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PortfolioSnapshot {
    positions: Vec<Position>,
    /// Market value per position, same order as `positions`
    values: Vec<f64>,
    /// Sum of `values`
    total_value: f64,
    /// Current weight per position (0 when `total_value` is 0)
    weights: Vec<f64>,
}

impl PortfolioSnapshot {
    /// Validate positions and derive values and weights.
    ///
    /// Rejects an empty table, empty or duplicate identifiers, non-positive
    /// prices and weights outside `[0, 1]`. Whether the target weights sum
    /// to 1 is checked by the engine, not here, so that a snapshot can be
    /// inspected before the allocation is fixed.
    pub fn new(positions: Vec<Position>) -> Result<Self> {
        if positions.is_empty() {
            return Err(RebalanceError::InvalidParameters(
                "portfolio has no positions".into(),
            ));
        }

        let mut seen = FxHashSet::default();
        for pos in &positions {
            pos.validate()?;
            if !seen.insert(pos.asset.as_str()) {
                return Err(RebalanceError::InvalidParameters(format!(
                    "duplicate asset: {}",
                    pos.asset
                )));
            }
        }

        let values: Vec<f64> = positions.iter().map(Position::market_value).collect();
        let total_value: f64 = values.iter().sum();
        let weights = values
            .iter()
            .map(|v| if total_value > 0.0 { v / total_value } else { 0.0 })
            .collect();

        Ok(Self {
            positions,
            values,
            total_value,
            weights,
        })
    }

    /// A new snapshot with the same assets, prices and targets but different
    /// share counts. `quantities` must have one entry per position.
    pub fn with_quantities(&self, quantities: &[u64]) -> Result<Self> {
        if quantities.len() != self.positions.len() {
            return Err(RebalanceError::InvalidParameters(format!(
                "expected {} quantities, got {}",
                self.positions.len(),
                quantities.len()
            )));
        }
        let positions = self
            .positions
            .iter()
            .zip(quantities)
            .map(|(p, &quantity)| Position { quantity, ..p.clone() })
            .collect();
        Self::new(positions)
    }

    #[inline]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Market value per position.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Total market value of all positions (cash excluded).
    #[inline]
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Current weight per position, as fractions.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Target weight per position, as fractions.
    pub fn target_weights(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.target_weight).collect()
    }

    /// Sum of target weights (1.0 for a valid allocation).
    pub fn target_sum(&self) -> f64 {
        self.positions.iter().map(|p| p.target_weight).sum()
    }

    /// Allocation index of the current holdings.
    pub fn allocation_index(&self) -> f64 {
        allocation_index(&self.weights, &self.target_weights())
    }

    /// Look up a position by asset identifier.
    pub fn position(&self, asset: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.asset == asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_assets() -> Vec<Position> {
        vec![
            Position::new("A", 10, 100.0, 0.5),
            Position::new("B", 5, 200.0, 0.3),
            Position::new("C", 8, 150.0, 0.2),
        ]
    }

    #[test]
    fn derived_fields() {
        let snap = PortfolioSnapshot::new(three_assets()).unwrap();
        assert_eq!(snap.values(), &[1000.0, 1000.0, 1200.0]);
        assert_eq!(snap.total_value(), 3200.0);
        assert!((snap.weights()[0] - 0.3125).abs() < 1e-12);
        assert!((snap.weights()[2] - 0.375).abs() < 1e-12);
        assert!((snap.target_sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn index_before_trading() {
        let snap = PortfolioSnapshot::new(three_assets()).unwrap();
        // |31.25-50| + |31.25-30| + |37.5-20| = 37.5
        assert!((snap.allocation_index() - 0.8125).abs() < 1e-12);
    }

    #[test]
    fn empty_portfolio_value_has_zero_weights() {
        let snap = PortfolioSnapshot::new(vec![
            Position::new("A", 0, 10.0, 0.5),
            Position::new("B", 0, 20.0, 0.5),
        ])
        .unwrap();
        assert_eq!(snap.total_value(), 0.0);
        assert_eq!(snap.weights(), &[0.0, 0.0]);
        assert!((snap.allocation_index() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reject_empty() {
        assert!(PortfolioSnapshot::new(vec![]).is_err());
    }

    #[test]
    fn reject_duplicate_assets() {
        let err = PortfolioSnapshot::new(vec![
            Position::new("A", 1, 10.0, 0.5),
            Position::new("A", 2, 10.0, 0.5),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate asset: A"));
    }

    #[test]
    fn reject_invalid_position() {
        assert!(PortfolioSnapshot::new(vec![Position::new("A", 1, 0.0, 1.0)]).is_err());
    }

    #[test]
    fn with_quantities_rolls_forward() {
        let snap = PortfolioSnapshot::new(three_assets()).unwrap();
        let next = snap.with_quantities(&[20, 5, 8]).unwrap();
        assert_eq!(next.total_value(), 4200.0);
        assert_eq!(next.position("A").unwrap().quantity, 20);
        assert_eq!(next.position("A").unwrap().target_weight, 0.5);
        // Original untouched
        assert_eq!(snap.position("A").unwrap().quantity, 10);
    }

    #[test]
    fn with_quantities_length_mismatch() {
        let snap = PortfolioSnapshot::new(three_assets()).unwrap();
        assert!(snap.with_quantities(&[1, 2]).is_err());
    }
}
