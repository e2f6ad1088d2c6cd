//! Error types for the task pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Pipeline error type.
///
/// Every variant except `ShutdownTimeout` is recoverable: the component that
/// detects it logs it and carries on with the next item.
#[derive(Error, Debug)]
pub enum Error {
    /// Entity construction or mutation rejected its input
    #[error("validation error: {0}")]
    Validation(String),

    /// A kind tag that is neither `task` nor `note`
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    /// Reading or writing a persisted kind failed
    #[error("persistence error ({}): {message}", path.display())]
    Persistence { path: PathBuf, message: String },

    /// Graceful shutdown did not finish inside its window
    #[error("shutdown did not complete within {grace:?}; forcing exit")]
    ShutdownTimeout { grace: Duration },

    /// Invalid pipeline configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A spawned actor panicked or was aborted
    #[error("{actor} task failed: {message}")]
    Actor { actor: &'static str, message: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Persistence {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Check whether this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
