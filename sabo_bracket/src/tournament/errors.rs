//! Tournament error types.

use super::models::TournamentStatus;
use crate::{
    bracket::{BracketError, TournamentId},
    prize::PrizeError,
};
use thiserror::Error;

/// Bracket storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Delta written for a bracket that was never saved
    #[error("No stored bracket for tournament {0}")]
    NotFound(TournamentId),

    /// Backend-specific failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Tournament orchestration errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Tournament cannot start play from status {actual:?}")]
    InvalidState { actual: TournamentStatus },

    #[error("Participant list has {provided} entries but {confirmed} are confirmed")]
    ParticipantCountMismatch { confirmed: usize, provided: usize },

    #[error("Bracket error: {0}")]
    Bracket(#[from] BracketError),

    #[error("Prize error: {0}")]
    Prize(#[from] PrizeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl TournamentError {
    /// Get a client-safe error message
    ///
    /// Storage errors are collapsed so backend details are not exposed.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(_) => "Internal server error".to_string(),
            TournamentError::Bracket(BracketError::CorruptTopology(_)) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
