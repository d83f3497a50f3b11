use std::path::PathBuf;

use crate::validate::ValidationError;

/// Failures a caller may want to tell apart from generic I/O plumbing.
#[derive(thiserror::Error, Debug)]
pub enum EtlError {
    /// An upstream table the current stage depends on is not on disk.
    #[error("missing source table: {}", path.display())]
    SourceMissing { path: PathBuf },

    #[error("csv error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// A required column is absent from a table read back from disk.
    #[error("{table} is missing columns: {}", missing.join(", "))]
    MissingColumns {
        table: &'static str,
        missing: Vec<String>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
