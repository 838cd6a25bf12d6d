//! TOML configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use allocore::BigM;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solver: SolverConfig,
    pub defaults: DefaultsConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seconds; 0 disables the limit
    pub time_limit_secs: f64,
    pub big_m: BigMSetting,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit(),
            big_m: BigMSetting::default(),
        }
    }
}

fn default_time_limit() -> f64 {
    allocore::DEFAULT_TIME_LIMIT.as_secs_f64()
}

/// `big_m = "per_asset"`, `big_m = "reference"` or `big_m = 1000000.0`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BigMSetting {
    Named(BigMName),
    Value(f64),
}

impl Default for BigMSetting {
    fn default() -> Self {
        BigMSetting::Named(BigMName::PerAsset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigMName {
    PerAsset,
    Reference,
}

/// Values used when the command line leaves them out.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub cash: Option<f64>,
    pub max_transactions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub currency: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency: "€".into(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        let limit = self.solver.time_limit_secs;
        if !limit.is_finite() || limit < 0.0 {
            return Err(Error::Config(
                "solver.time_limit_secs must be a finite number >= 0".into(),
            ));
        }
        if let BigMSetting::Value(m) = self.solver.big_m {
            if !m.is_finite() || m < 1.0 {
                return Err(Error::Config("solver.big_m must be >= 1".into()));
            }
        }
        if let Some(cash) = self.defaults.cash {
            if !cash.is_finite() || cash < 0.0 {
                return Err(Error::Config("defaults.cash must be >= 0".into()));
            }
        }
        Ok(())
    }

    /// Solver time budget; `None` when disabled.
    pub fn time_limit(&self) -> Option<Duration> {
        time_limit_from_secs(self.solver.time_limit_secs)
    }

    /// Linking-constraint bound for the engine.
    pub fn big_m(&self) -> BigM {
        match self.solver.big_m {
            BigMSetting::Named(BigMName::PerAsset) => BigM::PerAsset,
            BigMSetting::Named(BigMName::Reference) => BigM::REFERENCE,
            BigMSetting::Value(m) => BigM::Global(m),
        }
    }
}

/// Seconds to a solver budget; 0 means no limit.
pub fn time_limit_from_secs(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[solver]
time_limit_secs = 2.5
big_m = 1000000.0

[defaults]
cash = 1000.0
max_transactions = 3

[report]
currency = "$"
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml_str(example_toml()).unwrap();
        assert_eq!(config.solver.time_limit_secs, 2.5);
        assert_eq!(config.big_m(), BigM::REFERENCE);
        assert_eq!(config.defaults.cash, Some(1000.0));
        assert_eq!(config.defaults.max_transactions, Some(3));
        assert_eq!(config.report.currency, "$");
        assert_eq!(config.time_limit(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.time_limit(), Some(Duration::from_secs(10)));
        assert_eq!(config.big_m(), BigM::PerAsset);
        assert_eq!(config.defaults.cash, None);
        assert_eq!(config.report.currency, "€");
    }

    #[test]
    fn named_big_m() {
        let config = Config::from_toml_str("[solver]\nbig_m = \"per_asset\"\n").unwrap();
        assert_eq!(config.big_m(), BigM::PerAsset);
        let config = Config::from_toml_str("[solver]\nbig_m = \"reference\"\n").unwrap();
        assert_eq!(config.big_m(), BigM::REFERENCE);
        assert!(Config::from_toml_str("[solver]\nbig_m = \"huge\"\n").is_err());
    }

    #[test]
    fn zero_time_limit_disables() {
        let config = Config::from_toml_str("[solver]\ntime_limit_secs = 0.0\n").unwrap();
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn validate_catches_negative_time_limit() {
        let err = Config::from_toml_str("[solver]\ntime_limit_secs = -1.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_catches_small_big_m() {
        assert!(Config::from_toml_str("[solver]\nbig_m = 0.5\n").is_err());
    }

    #[test]
    fn validate_catches_negative_cash() {
        assert!(Config::from_toml_str("[defaults]\ncash = -10.0\n").is_err());
    }

    #[test]
    fn malformed_toml() {
        let err = Config::from_toml_str("[solver\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, example_toml()).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.defaults.max_transactions, Some(3));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(&path),
            Err(Error::ConfigRead { .. })
        ));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }
}
