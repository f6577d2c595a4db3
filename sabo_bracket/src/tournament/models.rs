//! Tournament data models exchanged with the persistence layer.

use crate::bracket::{Bracket, BracketFormat, MatchId, ScoreUpdate, Standing, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations
    Registration,
    /// Registration closed, waiting for the bracket
    Ready,
    /// Bracket generated, matches being played
    InProgress,
    /// Final played
    Completed,
    /// Tournament cancelled
    Cancelled,
}

impl TournamentStatus {
    /// Whether a bracket may be generated from this status
    pub fn can_start_play(&self) -> bool {
        matches!(self, TournamentStatus::Registration | TournamentStatus::Ready)
    }
}

/// Tournament record as stored by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRecord {
    /// Tournament ID
    pub id: TournamentId,
    /// Tournament name
    pub name: String,
    /// Elimination format
    pub format: BracketFormat,
    /// Current state
    pub status: TournamentStatus,
    /// Participants whose registration is confirmed
    pub confirmed_participants: usize,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl TournamentRecord {
    /// Create a record in the registration state
    pub fn new(id: TournamentId, name: String, format: BracketFormat) -> Self {
        Self {
            id,
            name,
            format,
            status: TournamentStatus::Registration,
            confirmed_participants: 0,
            created_at: Utc::now(),
        }
    }

    /// Set the confirmed participant count
    pub fn with_confirmed(mut self, confirmed: usize) -> Self {
        self.confirmed_participants = confirmed;
        self
    }
}

/// Score reported for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub match_id: MatchId,
    pub score1: i32,
    pub score2: i32,
}

impl ScoreSubmission {
    /// Create a new submission
    pub fn new(match_id: MatchId, score1: i32, score2: i32) -> Self {
        Self {
            match_id,
            score1,
            score2,
        }
    }
}

/// Result of a bracket generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketGeneration {
    pub bracket: Bracket,
    /// `false` when an existing bracket was returned
    pub created: bool,
}

/// Result of an accepted score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub update: ScoreUpdate,
    /// Present once the final has been played
    pub standings: Option<Vec<Standing>>,
}

impl ScoreOutcome {
    /// Whether this submission decided the tournament
    pub fn is_final(&self) -> bool {
        self.standings.is_some()
    }
}
