//! # SABO Bracket
//!
//! Tournament bracket engine for single elimination and SABO double
//! elimination events of up to sixteen participants.
//!
//! A bracket is a fixed graph of matches built once from a seeded field.
//! Every match records where its winner and loser go next, so submitting a
//! score resolves the downstream slots and promotes matches to READY as soon
//! as both of their participants are known. Byes complete on their own.
//!
//! ## Core Modules
//!
//! - [`bracket`]: Topology builder, score progression, READY queue and standings
//! - [`prize`]: Prize profiles and pool distribution
//! - [`tournament`]: Async manager with per-tournament locking and a persistence seam
//! - [`config`]: Engine limits read from the environment
//!
//! ## Example
//!
//! ```
//! use sabo_bracket::{BracketFormat, Participant, SeedingMethod, build, distribute};
//! use uuid::Uuid;
//!
//! let players: Vec<Participant> = (1..=4)
//!     .map(|seed| Participant::new(Uuid::new_v4(), seed))
//!     .collect();
//! let mut bracket = build(Uuid::new_v4(), &players, BracketFormat::SingleElim, SeedingMethod::Ranked)?;
//!
//! loop {
//!     let Some(id) = bracket.next_queue().next().map(|m| m.id) else {
//!         break;
//!     };
//!     bracket.submit_score(id, 3, 1)?;
//! }
//!
//! let schedule = distribute(10_000, "standard", None).expect("known profile");
//! let awards = schedule.award(&bracket.standings()?);
//! assert_eq!(awards[0].participant, players[0].id);
//! assert_eq!(awards[0].cash, 4_000);
//! # Ok::<(), sabo_bracket::BracketError>(())
//! ```

/// Bracket topology and progression.
pub mod bracket;
pub use bracket::{
    Bracket, BracketBranch, BracketError, BracketFormat, BracketResult, Match, MatchId,
    MatchStatus, Participant, ParticipantId, SeedingMethod, Standing, TournamentId, build,
    build_with_config,
};

/// Engine configuration.
pub mod config;
pub use config::EngineConfig;

/// Prize distribution.
pub mod prize;
pub use prize::{PrizeError, PrizeOverrides, PrizeSchedule, distribute};

/// Tournament orchestration and persistence.
pub mod tournament;
pub use tournament::{BracketStore, MemoryStore, TournamentError, TournamentManager};
