//! Error types for the rebalancer.

use std::path::PathBuf;

use allocore::RebalanceError;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("holdings error: {0}")]
    Holdings(String),

    #[error("failed to read holdings file {path}: {source}")]
    HoldingsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse holdings CSV: {0}")]
    HoldingsParse(#[from] csv::Error),

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Rebalance(#[from] RebalanceError),
}

impl Error {
    /// True for rejected inputs, as opposed to I/O or solver failures.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::Rebalance(e) => e.is_validation(),
            Error::Config(_) | Error::Holdings(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
