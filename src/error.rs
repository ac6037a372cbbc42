//! Errors raised while building a table configuration.
//!
//! Formatting and filtering never fail; only an invalid column set is
//! rejected, and it is rejected before anything is rendered or exported.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TableConfigError {
    /// A column has no header label.
    #[error("Column {index} has no header")]
    MissingHeader { index: usize },

    /// A column has neither a field name nor an accessor function.
    #[error("Column {index} has no accessor")]
    MissingAccessor { index: usize },

    /// An explicit width outside 0-100.
    #[error("Column {index} has an invalid width percentage: {width}")]
    InvalidWidth { index: usize, width: f64 },

    /// A configured search field is blank.
    #[error("Filter field {index} is empty")]
    EmptyFilterField { index: usize },

    #[error("Failed to read table definition {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse table definition {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl TableConfigError {
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
