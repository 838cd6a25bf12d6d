//! Portfolio holdings table (portfolio.csv) loading.
//!
//! Expected header: `Asset,Quantity,Price,Target Allocation`, with the target
//! allocation in percent.

use std::io::Read;
use std::path::Path;

use allocore::{PortfolioSnapshot, Position};
use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// One CSV row, before conversion to an engine [`Position`].
#[derive(Debug, Clone, Deserialize)]
struct HoldingRow {
    #[serde(rename = "Asset")]
    asset: String,
    #[serde(rename = "Quantity")]
    quantity: u64,
    #[serde(rename = "Price")]
    price: f64,
    /// Percent, 0..=100
    #[serde(rename = "Target Allocation")]
    target_pct: f64,
}

impl HoldingRow {
    fn into_position(self) -> Position {
        Position::from_percent(self.asset, self.quantity, self.price, self.target_pct)
    }
}

/// Load holdings from a CSV file.
pub fn load(path: &Path) -> Result<PortfolioSnapshot> {
    let file = std::fs::File::open(path).map_err(|e| Error::HoldingsRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let snapshot = from_reader(file)?;
    debug!(
        "loaded {} positions from {} (value {:.2})",
        snapshot.len(),
        path.display(),
        snapshot.total_value()
    );
    Ok(snapshot)
}

/// Parse holdings from CSV text.
pub fn from_csv_str(text: &str) -> Result<PortfolioSnapshot> {
    from_reader(text.as_bytes())
}

/// Parse holdings from any CSV source. Every row must parse; a bad row fails
/// the whole table.
pub fn from_reader<R: Read>(reader: R) -> Result<PortfolioSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut positions = Vec::new();
    for row in reader.deserialize::<HoldingRow>() {
        positions.push(row?.into_position());
    }

    if positions.is_empty() {
        return Err(Error::Holdings("holdings table has no rows".into()));
    }

    PortfolioSnapshot::new(positions).map_err(|e| Error::Holdings(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const PORTFOLIO: &str = "\
Asset,Quantity,Price,Target Allocation
A,10,100,50
B,5,200,30
C,8,150,20
";

    #[test]
    fn parse_reference_table() {
        let snapshot = from_csv_str(PORTFOLIO).unwrap();
        assert_eq!(snapshot.len(), 3);
        let b = snapshot.position("B").unwrap();
        assert_eq!(b.quantity, 5);
        assert_eq!(b.price, 200.0);
        assert!((b.target_weight - 0.3).abs() < 1e-12);
        assert!((snapshot.target_sum() - 1.0).abs() < 1e-12);
        assert_eq!(snapshot.total_value(), 3200.0);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let text = "Asset, Quantity, Price, Target Allocation\n VTI , 3 , 210.5 , 100\n";
        let snapshot = from_csv_str(text).unwrap();
        assert_eq!(snapshot.positions()[0].asset, "VTI");
        assert_eq!(snapshot.positions()[0].price, 210.5);
    }

    #[test]
    fn header_only_is_rejected() {
        let err = from_csv_str("Asset,Quantity,Price,Target Allocation\n").unwrap_err();
        assert!(matches!(err, Error::Holdings(_)));
    }

    #[test]
    fn unparsable_row_is_rejected() {
        let text = "Asset,Quantity,Price,Target Allocation\nA,ten,100,100\n";
        assert!(matches!(
            from_csv_str(text),
            Err(Error::HoldingsParse(_))
        ));
    }

    #[test]
    fn missing_column_is_rejected() {
        let text = "Asset,Quantity,Price\nA,10,100\n";
        assert!(from_csv_str(text).is_err());
    }

    #[test]
    fn invalid_position_is_rejected() {
        let text = "Asset,Quantity,Price,Target Allocation\nA,10,0,100\n";
        assert!(matches!(from_csv_str(text), Err(Error::Holdings(_))));
        let text = "Asset,Quantity,Price,Target Allocation\nA,1,10,50\nA,1,10,50\n";
        assert!(matches!(from_csv_str(text), Err(Error::Holdings(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PORTFOLIO.as_bytes()).unwrap();
        let snapshot = load(file.path()).unwrap();
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("portfolio.csv")).unwrap_err();
        assert!(matches!(err, Error::HoldingsRead { .. }));
    }
}
