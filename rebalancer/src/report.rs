//! Terminal rendering of snapshots, rebalancing results and sweeps.

use std::fmt;

use allocore::{PortfolioSnapshot, RebalancingResult, deviation_pct};

const INDEX_NOTE: &str = "(1 indicates a perfect match with the target allocation)";

/// Full text report for one rebalance: orders, totals, comparison table and
/// allocation index.
pub struct ResultReport<'a> {
    pub result: &'a RebalancingResult,
    pub currency: &'a str,
}

impl<'a> ResultReport<'a> {
    pub fn new(result: &'a RebalancingResult, currency: &'a str) -> Self {
        Self { result, currency }
    }
}

impl fmt::Display for ResultReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        let cur = self.currency;

        writeln!(f, "Orders to place to minimize deviation from the target allocation:")?;
        if r.is_empty() {
            writeln!(f, "No purchases are recommended with the given constraints.")?;
        } else {
            for order in r.orders() {
                writeln!(
                    f,
                    "- Buy {} shares of {} for {:.2} {cur}",
                    order.purchase, order.asset, order.cost
                )?;
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Total amount invested: {:.2} {cur} ({:.2}% of the amount to invest)",
            r.total_invested, r.percent_invested
        )?;

        writeln!(f)?;
        writeln!(f, "Comparison of old and new positions:")?;
        let width = asset_width(r.assets.iter().map(|a| a.asset.as_str()));
        writeln!(
            f,
            "{:<width$}  {:>8}  {:>8}  {:^6}  {:>7}  {:>7}  {:>8}  {:>11}",
            "Asset", "Old Qty", "New Qty", "Change", "Old %", "New %", "Target %", "Deviation %"
        )?;
        for a in &r.assets {
            let marker = if a.new_quantity != a.old_quantity { "→" } else { "" };
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>8}  {:^6}  {:>7.2}  {:>7.2}  {:>8.2}  {:>11.2}",
                a.asset,
                a.old_quantity,
                a.new_quantity,
                marker,
                a.old_weight * 100.0,
                a.new_weight * 100.0,
                a.target_weight * 100.0,
                a.deviation_after,
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Allocation index before: {:.4}", r.index_before)?;
        writeln!(f, "Allocation index after:  {:.4} {INDEX_NOTE}", r.index_after)
    }
}

/// Current weights against targets, without solving.
pub struct SnapshotReport<'a> {
    pub snapshot: &'a PortfolioSnapshot,
    pub currency: &'a str,
}

impl<'a> SnapshotReport<'a> {
    pub fn new(snapshot: &'a PortfolioSnapshot, currency: &'a str) -> Self {
        Self { snapshot, currency }
    }
}

impl fmt::Display for SnapshotReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.snapshot;
        writeln!(
            f,
            "Portfolio: {} positions, {:.2} {}",
            s.len(),
            s.total_value(),
            self.currency
        )?;
        writeln!(f)?;

        let width = asset_width(s.positions().iter().map(|p| p.asset.as_str()));
        writeln!(
            f,
            "{:<width$}  {:>8}  {:>10}  {:>12}  {:>7}  {:>8}  {:>11}",
            "Asset", "Qty", "Price", "Value", "Weight %", "Target %", "Deviation %"
        )?;
        for ((p, &value), &weight) in s.positions().iter().zip(s.values()).zip(s.weights()) {
            writeln!(
                f,
                "{:<width$}  {:>8}  {:>10.2}  {:>12.2}  {:>7.2}  {:>8.2}  {:>11.2}",
                p.asset,
                p.quantity,
                p.price,
                value,
                weight * 100.0,
                p.target_weight * 100.0,
                deviation_pct(weight, p.target_weight),
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Target allocation sum: {:.2}%", s.target_sum() * 100.0)?;
        writeln!(f, "Allocation index: {:.4} {INDEX_NOTE}", s.allocation_index())
    }
}

/// One line per transaction cap.
pub struct SweepReport<'a> {
    pub caps: &'a [usize],
    pub results: &'a [allocore::Result<RebalancingResult>],
    pub currency: &'a str,
}

impl fmt::Display for SweepReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8}  {:>12}  {:>12}  {:>11}",
            "Max Txns", "Transactions", "Invested", "Index After"
        )?;
        for (cap, result) in self.caps.iter().zip(self.results) {
            match result {
                Ok(r) => writeln!(
                    f,
                    "{:>8}  {:>12}  {:>10.2} {}  {:>11.4}",
                    cap, r.transactions, r.total_invested, self.currency, r.index_after
                )?,
                Err(e) => writeln!(f, "{cap:>8}  error: {e}")?,
            }
        }
        Ok(())
    }
}

fn asset_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max("Asset".len())
}

#[cfg(test)]
mod tests {
    use allocore::{Position, RebalanceError};

    use super::*;

    fn snapshot() -> PortfolioSnapshot {
        PortfolioSnapshot::new(vec![
            Position::from_percent("A", 10, 100.0, 50.0),
            Position::from_percent("B", 5, 200.0, 30.0),
            Position::from_percent("C", 8, 150.0, 20.0),
        ])
        .unwrap()
    }

    #[test]
    fn result_report_lists_orders() {
        let result = RebalancingResult::derive(&snapshot(), 1000.0, &[10, 0, 0]).unwrap();
        let text = ResultReport::new(&result, "€").to_string();

        assert!(text.contains("- Buy 10 shares of A for 1000.00 €"));
        assert!(!text.contains("shares of B"));
        assert!(text.contains("Total amount invested: 1000.00 € (100.00% of the amount to invest)"));
        assert!(text.contains("Allocation index before: 0.8125"));
        assert!(text.contains("Allocation index after:  0.9143"));
        assert!(text.contains("→"));
    }

    #[test]
    fn result_report_without_purchases() {
        let result = RebalancingResult::derive(&snapshot(), 0.0, &[0, 0, 0]).unwrap();
        let text = ResultReport::new(&result, "$").to_string();

        assert!(text.contains("No purchases are recommended with the given constraints."));
        assert!(text.contains("Total amount invested: 0.00 $ (0.00% of the amount to invest)"));
        assert!(!text.contains("→"));
    }

    #[test]
    fn snapshot_report() {
        let text = SnapshotReport::new(&snapshot(), "€").to_string();
        assert!(text.contains("Portfolio: 3 positions, 3200.00 €"));
        assert!(text.contains("Target allocation sum: 100.00%"));
        assert!(text.contains("Allocation index: 0.8125"));
    }

    #[test]
    fn sweep_report_shows_errors_inline() {
        let ok = RebalancingResult::derive(&snapshot(), 1000.0, &[10, 0, 0]).unwrap();
        let results = vec![
            Ok(ok),
            Err(RebalanceError::SolverTimeout { limit_secs: 1.0 }),
        ];
        let text = SweepReport {
            caps: &[1, 2],
            results: &results,
            currency: "€",
        }
        .to_string();
        assert!(text.contains("0.9143"));
        assert!(text.contains("error: optimization did not complete"));
    }

    #[test]
    fn asset_column_fits_long_names() {
        assert_eq!(asset_width(["A", "BB"].into_iter()), 5);
        assert_eq!(asset_width(["VERYLONGNAME"].into_iter()), 12);
    }
}
