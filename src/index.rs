//! Allocation quality index.
//!
//! The index compares actual weights with target weights on a `[0, 1]`
//! scale, 1 being a perfect match:
//!
//! ```text
//! index = 1 - Σ |weight_i - target_i| / 200      (weights in percent)
//! ```
//!
//! The absolute percentage deviations of two allocations that each sum to
//! 100 add up to at most 200, which is where the constant comes from.

/// Largest possible sum of absolute percentage-point deviations.
pub const MAX_TOTAL_DEVIATION_PCT: f64 = 200.0;

/// Absolute deviation of `weight` from `target`, in percentage points.
///
/// Both arguments are fractions.
#[inline]
pub fn deviation_pct(weight: f64, target: f64) -> f64 {
    (weight * 100.0 - target * 100.0).abs()
}

/// Allocation index of `weights` against `targets` (both fractions, same
/// length and order).
///
/// Clamped to `[0, 1]` to absorb floating-point noise.
pub fn allocation_index(weights: &[f64], targets: &[f64]) -> f64 {
    debug_assert_eq!(weights.len(), targets.len());
    let total: f64 = weights
        .iter()
        .zip(targets)
        .map(|(&w, &t)| deviation_pct(w, t))
        .sum();
    index_from_total_deviation(total)
}

/// Allocation index from an already-summed percentage-point deviation.
#[inline]
pub fn index_from_total_deviation(total_pct: f64) -> f64 {
    (1.0 - total_pct / MAX_TOTAL_DEVIATION_PCT).clamp(0.0, 1.0)
}
