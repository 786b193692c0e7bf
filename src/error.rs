//! Error types for the mountain rescue crate

use thiserror::Error;

use crate::types::{Action, StateId};

/// Main error type for the mountain rescue crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid grid size {rows}x{columns}: grid must be square with at least one cell")]
    InvalidSize { rows: usize, columns: usize },

    #[error("dataset inconsistency: {reason}")]
    DatasetInconsistency { reason: String },

    #[error("policy picks illegal action {action} in state {state}: no matching dataset record")]
    IllegalPolicyAction { state: StateId, action: Action },

    #[error("policy has no action for state {state}")]
    MissingPolicyState { state: StateId },

    #[error("usage error: {message}")]
    Usage { message: String },

    #[error("invalid action code {code} (expected 1=up, 2=right, 3=down, 4=left)")]
    InvalidAction { code: u8 },

    #[error("invalid state id {value} (state ids start at 1)")]
    InvalidState { value: usize },

    #[error("dataset has no transition records")]
    EmptyDataset,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("malformed policy file at line {line}: '{content}' is not an action code")]
    MalformedPolicy { line: usize, content: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("statistics error: {message}")]
    Statistics { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an I/O error with the operation that failed
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Error::DatasetInconsistency {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
