//! A single holding and its target weight.

use crate::error::{RebalanceError, Result};

/// One row of the portfolio table.
///
/// `target_weight` is a fraction in `[0, 1]`, not a percentage. Use
/// [`Position::from_percent`] when reading a table expressed in percent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Unique asset identifier (ticker, ISIN, ...)
    pub asset: String,
    /// Shares currently held
    pub quantity: u64,
    /// Price per share
    pub price: f64,
    /// Desired fraction of total portfolio value
    pub target_weight: f64,
}

impl Position {
    pub fn new(asset: impl Into<String>, quantity: u64, price: f64, target_weight: f64) -> Self {
        Self {
            asset: asset.into(),
            quantity,
            price,
            target_weight,
        }
    }

    /// Build a position from a target allocation given in percent (0–100).
    pub fn from_percent(
        asset: impl Into<String>,
        quantity: u64,
        price: f64,
        target_pct: f64,
    ) -> Self {
        Self::new(asset, quantity, price, target_pct / 100.0)
    }

    /// Current market value: quantity × price.
    #[inline]
    pub fn market_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Market value after buying `shares` more.
    #[inline]
    pub fn value_after(&self, shares: u64) -> f64 {
        (self.quantity + shares) as f64 * self.price
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.asset.trim().is_empty() {
            return Err(RebalanceError::InvalidParameters(
                "asset identifier must not be empty".into(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(RebalanceError::InvalidParameters(format!(
                "price for {} must be positive and finite, got {}",
                self.asset, self.price
            )));
        }
        if !self.target_weight.is_finite() || !(0.0..=1.0).contains(&self.target_weight) {
            return Err(RebalanceError::InvalidParameters(format!(
                "target weight for {} must be in [0, 1], got {}",
                self.asset, self.target_weight
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_value() {
        let pos = Position::new("VTI", 10, 250.5, 0.6);
        assert_eq!(pos.market_value(), 2505.0);
        assert_eq!(pos.value_after(2), 3006.0);
    }

    #[test]
    fn from_percent_converts() {
        let pos = Position::from_percent("BND", 4, 72.0, 40.0);
        assert!((pos.target_weight - 0.4).abs() < 1e-12);
    }

    #[test]
    fn zero_quantity_is_valid() {
        assert!(Position::new("GLD", 0, 180.0, 0.1).validate().is_ok());
    }

    #[test]
    fn reject_empty_asset() {
        assert!(Position::new("  ", 1, 10.0, 0.5).validate().is_err());
    }

    #[test]
    fn reject_bad_price() {
        assert!(Position::new("A", 1, 0.0, 0.5).validate().is_err());
        assert!(Position::new("A", 1, -3.0, 0.5).validate().is_err());
        assert!(Position::new("A", 1, f64::NAN, 0.5).validate().is_err());
        assert!(Position::new("A", 1, f64::INFINITY, 0.5).validate().is_err());
    }

    #[test]
    fn reject_weight_out_of_range() {
        assert!(Position::new("A", 1, 10.0, 1.5).validate().is_err());
        assert!(Position::new("A", 1, 10.0, -0.1).validate().is_err());
        assert!(Position::new("A", 1, 10.0, f64::NAN).validate().is_err());
    }
}
