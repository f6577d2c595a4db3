//! Bracket data models.

use super::errors::{BracketError, BracketResult, ParseLabelError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Participant ID type (opaque to the engine)
pub type ParticipantId = Uuid;

/// Match ID type, 1-based and dense within one bracket
pub type MatchId = u32;

/// Elimination format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketFormat {
    /// One loss eliminates
    SingleElim,
    /// Winners and losers brackets merging into a semifinal and final
    SaboDouble,
}

impl fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketFormat::SingleElim => write!(f, "SINGLE_ELIM"),
            BracketFormat::SaboDouble => write!(f, "SABO_DOUBLE"),
        }
    }
}

impl FromStr for BracketFormat {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE_ELIM" => Ok(BracketFormat::SingleElim),
            "SABO_DOUBLE" => Ok(BracketFormat::SaboDouble),
            _ => Err(ParseLabelError::new("format", s)),
        }
    }
}

/// How the participant list is turned into seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Sort by seed rank, ascending; equal ranks keep list order
    Ranked,
    /// List order is the seed order
    AsListed,
    /// Deterministic shuffle from the given seed
    ///
    /// Uses `rand`'s `StdRng`, whose stream may change between `rand`
    /// releases. The stored bracket keeps the resulting seed order, so
    /// existing brackets are unaffected, but rebuilding from the same seed
    /// after a `rand` upgrade can produce a different order.
    Shuffled { seed: u64 },
}

/// Which advancement sub-graph a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketBranch {
    Winners,
    Losers,
    Semifinal,
    Final,
}

impl fmt::Display for BracketBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketBranch::Winners => write!(f, "WINNERS"),
            BracketBranch::Losers => write!(f, "LOSERS"),
            BracketBranch::Semifinal => write!(f, "SEMIFINAL"),
            BracketBranch::Final => write!(f, "FINAL"),
        }
    }
}

impl FromStr for BracketBranch {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WINNERS" => Ok(BracketBranch::Winners),
            "LOSERS" => Ok(BracketBranch::Losers),
            "SEMIFINAL" => Ok(BracketBranch::Semifinal),
            "FINAL" => Ok(BracketBranch::Final),
            _ => Err(ParseLabelError::new("branch", s)),
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// At least one slot is still a forward reference
    Pending,
    /// Both slots hold participants, no result yet
    Ready,
    /// Outcome recorded (played or bye)
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "PENDING"),
            MatchStatus::Ready => write!(f, "READY"),
            MatchStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(MatchStatus::Pending),
            "READY" => Ok(MatchStatus::Ready),
            "COMPLETED" => Ok(MatchStatus::Completed),
            _ => Err(ParseLabelError::new("status", s)),
        }
    }
}

/// A seeded entrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque identifier
    pub id: ParticipantId,
    /// Seed rank, 1 is best; only used for initial placement
    pub seed: u32,
}

impl Participant {
    /// Create a new participant
    pub fn new(id: ParticipantId, seed: u32) -> Self {
        Self { id, seed }
    }
}

/// Contents of a match input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "snake_case")]
pub enum Slot {
    /// Resolved entrant
    Participant(ParticipantId),
    /// Filled by the winner of the referenced match
    WinnerOf(MatchId),
    /// Filled by the loser of the referenced match
    LoserOf(MatchId),
    /// Permanently empty
    Bye,
}

impl Slot {
    /// Participant in this slot, if resolved to one
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Slot::Participant(id) => Some(*id),
            _ => None,
        }
    }

    /// Match this slot is waiting on, if any
    pub fn source(&self) -> Option<MatchId> {
        match self {
            Slot::WinnerOf(id) | Slot::LoserOf(id) => Some(*id),
            Slot::Participant(_) | Slot::Bye => None,
        }
    }
}

/// Which input of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPosition {
    First,
    Second,
}

/// Back-edge from a match to the downstream slot its winner or loser fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub match_id: MatchId,
    pub position: SlotPosition,
}

/// Recorded game score, slot1 first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub slot1: u32,
    pub slot2: u32,
}

/// One node of the bracket graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Round within the branch (1-indexed)
    pub round_number: u32,
    /// Position within the round (1-indexed)
    pub match_number: u32,
    #[serde(rename = "bracket_branch")]
    pub branch: BracketBranch,
    pub slot1: Slot,
    pub slot2: Slot,
    pub status: MatchStatus,
    pub winner: Option<ParticipantId>,
    pub loser: Option<ParticipantId>,
    /// Present only for matches completed by play
    pub scores: Option<MatchScore>,
    /// Where the winner advances; `None` for the final
    pub winner_to: Option<SlotRef>,
    /// Where the loser drops; `None` when losing eliminates
    pub loser_to: Option<SlotRef>,
}

impl Match {
    pub(crate) fn new(
        id: MatchId,
        round_number: u32,
        match_number: u32,
        branch: BracketBranch,
        slot1: Slot,
        slot2: Slot,
    ) -> Self {
        Self {
            id,
            round_number,
            match_number,
            branch,
            slot1,
            slot2,
            status: MatchStatus::Pending,
            winner: None,
            loser: None,
            scores: None,
            winner_to: None,
            loser_to: None,
        }
    }

    /// Get a slot by position
    pub fn slot(&self, position: SlotPosition) -> &Slot {
        match position {
            SlotPosition::First => &self.slot1,
            SlotPosition::Second => &self.slot2,
        }
    }

    pub(crate) fn slot_mut(&mut self, position: SlotPosition) -> &mut Slot {
        match position {
            SlotPosition::First => &mut self.slot1,
            SlotPosition::Second => &mut self.slot2,
        }
    }

    /// Completed without being played
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Completed && self.scores.is_none()
    }

    /// Matches whose slots this match's result fills
    pub fn dependents(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.winner_to
            .iter()
            .chain(self.loser_to.iter())
            .map(|target| target.match_id)
    }

    /// Whether the participant currently occupies either slot
    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.slot1.participant() == Some(participant) || self.slot2.participant() == Some(participant)
    }
}

/// Result of an accepted score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    /// The scored match, now completed
    pub completed: Match,
    /// Downstream matches whose slots or status changed, in resolution order
    pub advanced: Vec<Match>,
}

impl ScoreUpdate {
    /// Every match the submission changed, scored match first
    pub fn changed_matches(&self) -> impl Iterator<Item = &Match> {
        std::iter::once(&self.completed).chain(self.advanced.iter())
    }
}

/// Final placing of one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Unique 1-based position in the ordered standings
    pub position: u32,
    /// First position of the elimination stage this participant shares
    /// (e.g. 5 for both entrants knocked out in the 5-6 round)
    pub shared_position: u32,
    pub participant: ParticipantId,
    pub seed: u32,
    /// Match that eliminated the participant; `None` for the champion
    pub eliminated_in: Option<MatchId>,
}

/// Full match graph for one tournament
///
/// Matches live in an arena indexed by `id - 1`; slots refer to other
/// matches by id, never by pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub tournament_id: TournamentId,
    pub format: BracketFormat,
    pub seeding: SeedingMethod,
    /// Bracket size (power of two) including byes
    pub size: usize,
    /// Participants in seed order, seeds `1..=n`
    pub participants: Vec<Participant>,
    pub(crate) matches: Vec<Match>,
    pub(crate) final_match: MatchId,
    pub generated_at: DateTime<Utc>,
}

impl Bracket {
    /// All matches in id order
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Get a match by id
    pub fn get(&self, match_id: MatchId) -> Option<&Match> {
        match_id
            .checked_sub(1)
            .and_then(|idx| self.matches.get(idx as usize))
    }

    pub(crate) fn get_mut(&mut self, match_id: MatchId) -> BracketResult<&mut Match> {
        match_id
            .checked_sub(1)
            .and_then(|idx| self.matches.get_mut(idx as usize))
            .ok_or(BracketError::MatchNotFound(match_id))
    }

    /// Id of the terminal match
    pub fn final_match_id(&self) -> MatchId {
        self.final_match
    }

    /// Matches in one branch, id order
    pub fn branch(&self, branch: BracketBranch) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.branch == branch)
    }

    /// Number of rounds in a branch
    pub fn rounds(&self, branch: BracketBranch) -> u32 {
        self.branch(branch)
            .map(|m| m.round_number)
            .max()
            .unwrap_or(0)
    }

    /// Seeded participant by id
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }
}
