use std::path::PathBuf;

use mrm_store::StoreError;

#[derive(Debug)]
pub enum BatchError {
    /// The ledger store has not been initialised (or lost a required table).
    LedgerUnavailable { reason: String },
    /// The market data source produced no usable instrument.
    NoMarketData { source: String },
    Store(StoreError),
    /// The trigger history could not be saved.
    History { path: PathBuf, message: String },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LedgerUnavailable { reason } => write!(f, "ledger unavailable: {reason}"),
            Self::NoMarketData { source } => write!(f, "no market data from {source}"),
            Self::Store(e) => write!(f, "ledger store: {e}"),
            Self::History { path, message } => {
                write!(f, "trigger history {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for BatchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Missing { path } => BatchError::LedgerUnavailable {
                reason: format!("missing {}", path.display()),
            },
            other => BatchError::Store(other),
        }
    }
}
