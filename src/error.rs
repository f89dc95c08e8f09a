//! Error types for the Annex library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`AnnexError`] enum. Errors fall into three broad kinds (see
//! [`ErrorKind`]) so that a transport layer can decide how to report them
//! without matching on every variant.
//!
//! # Examples
//!
//! ```
//! use annex::error::{AnnexError, ErrorKind, Result};
//!
//! fn check(expected: usize, actual: usize) -> Result<()> {
//!     if expected != actual {
//!         return Err(AnnexError::dimension_mismatch(expected, actual));
//!     }
//!     Ok(())
//! }
//!
//! let err = check(4, 3).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ClientInput);
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Annex operations.
#[derive(Error, Debug)]
pub enum AnnexError {
    /// Vector lengths disagree, either within the dataset, between the
    /// dataset and a query, or between a query and a built index.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An index was requested over zero points.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Invalid configuration parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid call arguments (e.g. `k == 0`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation cancelled through a cancellation token.
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Operation exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Broken invariant inside the index.
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O errors (config and request files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with AnnexError.
pub type Result<T> = std::result::Result<T, AnnexError>;

/// Coarse classification used when reporting an error to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed; resubmitting it unchanged will fail again.
    ClientInput,
    /// The caller cancelled the work or its deadline passed.
    Cancelled,
    /// Anything else.
    Internal,
}

impl AnnexError {
    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        AnnexError::DimensionMismatch { expected, actual }
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        AnnexError::InvalidConfig(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        AnnexError::InvalidArgument(msg.into())
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        AnnexError::OperationCancelled(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        AnnexError::Timeout(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        AnnexError::Internal(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnnexError::DimensionMismatch { .. }
            | AnnexError::EmptyDataset
            | AnnexError::InvalidConfig(_)
            | AnnexError::InvalidArgument(_)
            | AnnexError::Json(_) => ErrorKind::ClientInput,
            AnnexError::OperationCancelled(_) | AnnexError::Timeout(_) => ErrorKind::Cancelled,
            AnnexError::Internal(_) | AnnexError::Io(_) | AnnexError::Anyhow(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether this error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::ClientInput
    }
}
