//! Bracket error types.

use super::models::{BracketFormat, MatchId, MatchStatus, ParticipantId};
use thiserror::Error;

/// Bracket construction and progression errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BracketError {
    /// Fewer confirmed participants than the format needs
    #[error("Insufficient participants for {format}: need {needed}, have {current}")]
    InsufficientParticipants {
        format: BracketFormat,
        needed: usize,
        current: usize,
    },

    /// No seeding table exists for this participant count
    #[error("Unsupported bracket size for {format}: {count} participants (max {max})")]
    UnsupportedSize {
        format: BracketFormat,
        count: usize,
        max: usize,
    },

    /// The same participant was listed twice
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),

    /// Match id does not exist in this bracket
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Match already has a recorded outcome
    #[error("Match {0} is already completed")]
    AlreadyCompleted(MatchId),

    /// Match inputs are not resolved yet
    #[error("Match {match_id} is not ready: status {status}")]
    NotReady {
        match_id: MatchId,
        status: MatchStatus,
    },

    /// Tied or negative score
    #[error("Invalid score {score1}-{score2}: {reason}")]
    InvalidScore {
        score1: i32,
        score2: i32,
        reason: &'static str,
    },

    /// Standings requested before the final was played
    #[error("Bracket is not finished")]
    NotFinished,

    /// Stored graph does not describe a consistent bracket
    #[error("Corrupt bracket topology: {0}")]
    CorruptTopology(String),
}

impl BracketError {
    /// Whether retrying the same call can ever succeed without the caller
    /// changing its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BracketError::NotReady { .. } | BracketError::NotFinished)
    }
}

/// Unrecognized wire label for a format, branch or status
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind} label: {label}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub label: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
