use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    /// The store directory or one of its required tables does not exist.
    Missing { path: PathBuf },
    /// `init` refused to overwrite an existing store.
    AlreadyExists { path: PathBuf },
    Io { path: PathBuf, message: String },
    Csv { path: PathBuf, message: String },
    /// A row the ledger cannot do without (positions, cash) is unreadable.
    Malformed {
        path: PathBuf,
        row: usize,
        reason: String,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "ledger store missing: {}", path.display()),
            Self::AlreadyExists { path } => {
                write!(f, "ledger store already exists: {}", path.display())
            }
            Self::Io { path, message } => write!(f, "io error on {}: {message}", path.display()),
            Self::Csv { path, message } => write!(f, "csv error in {}: {message}", path.display()),
            Self::Malformed { path, row, reason } => {
                write!(f, "{} row {row}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {}
