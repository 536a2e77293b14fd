use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors that leave the trait table unavailable.
///
/// Every variant is fatal for page rendering: a table is either loaded whole
/// or not at all.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The source file could not be opened
    #[error("Cannot read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file is not a well-formed delimited table
    #[error("Cannot parse dataset {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The species key column is absent from the header
    #[error("Dataset has no `{column}` column")]
    MissingColumn { column: String },

    /// The header names a column twice
    #[error("Dataset header repeats column `{column}`")]
    DuplicateColumn { column: String },

    /// A data row is wider than the header
    #[error("Row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl DatasetError {
    /// Stable machine-readable code. All load failures share one condition.
    pub const fn code(&self) -> &'static str {
        "data_unavailable"
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
