//! Prize error types.

use thiserror::Error;

/// Prize distribution errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrizeError {
    /// Profile name is not in the table
    #[error("Unknown prize profile: {0}")]
    UnknownProfile(String),
}

/// Result type for prize operations
pub type PrizeResult<T> = Result<T, PrizeError>;
