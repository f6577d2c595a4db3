//! Bracket module: topology construction and score-driven progression.
//!
//! This module provides:
//! - Single elimination and SABO double elimination builders
//! - Seeding (ranked, as listed, deterministic shuffle) with byes for the top seeds
//! - Score submission with validation and downstream slot resolution
//! - The READY queue and final standings
//!
//! ## Example
//!
//! ```
//! use sabo_bracket::bracket::{self, BracketFormat, Participant, SeedingMethod};
//! use uuid::Uuid;
//!
//! let players: Vec<Participant> = (1..=8)
//!     .map(|seed| Participant::new(Uuid::new_v4(), seed))
//!     .collect();
//!
//! let mut bracket = bracket::build(
//!     Uuid::new_v4(),
//!     &players,
//!     BracketFormat::SaboDouble,
//!     SeedingMethod::Ranked,
//! )?;
//! assert_eq!(bracket.matches().len(), 14);
//!
//! // Play every match slot 1 wins until the final is decided
//! loop {
//!     let Some(id) = bracket.next_queue().next().map(|m| m.id) else {
//!         break;
//!     };
//!     bracket.submit_score(id, 2, 1)?;
//! }
//! assert_eq!(bracket.champion(), Some(players[0].id));
//! # Ok::<(), sabo_bracket::bracket::BracketError>(())
//! ```

pub mod builder;
pub mod errors;
pub mod models;
pub mod progression;

pub use builder::{bracket_size, build, build_with_config, seed_participants, seed_positions};
pub use errors::{BracketError, BracketResult, ParseLabelError};
pub use models::{
    Bracket, BracketBranch, BracketFormat, Match, MatchId, MatchScore, MatchStatus, Participant,
    ParticipantId, ScoreUpdate, SeedingMethod, Slot, SlotPosition, SlotRef, Standing, TournamentId,
};
