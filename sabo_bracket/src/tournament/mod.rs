//! Tournament module: the async surface hosts call.
//!
//! This module provides:
//! - Idempotent bracket generation gated on tournament status
//! - Serialized score submission per tournament with delta persistence
//! - READY queue, standings and award lookups
//! - The [`BracketStore`] seam plus an in-memory implementation
//!
//! ## Example
//!
//! ```
//! use sabo_bracket::{
//!     bracket::{BracketFormat, Participant, SeedingMethod},
//!     config::EngineConfig,
//!     tournament::{MemoryStore, ScoreSubmission, TournamentManager, TournamentRecord},
//! };
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let manager = TournamentManager::new(Arc::new(MemoryStore::new()), EngineConfig::default());
//!     let record = TournamentRecord::new(Uuid::new_v4(), "Friday cup".to_string(), BracketFormat::SingleElim)
//!         .with_confirmed(2);
//!     let players = vec![
//!         Participant::new(Uuid::new_v4(), 1),
//!         Participant::new(Uuid::new_v4(), 2),
//!     ];
//!
//!     manager
//!         .generate_bracket(&record, &players, SeedingMethod::Ranked)
//!         .await
//!         .unwrap();
//!     let outcome = manager
//!         .submit_score(record.id, ScoreSubmission::new(1, 7, 3))
//!         .await
//!         .unwrap();
//!     assert!(outcome.is_final());
//! });
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod store;

pub use errors::{StoreError, StoreResult, TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    BracketGeneration, ScoreOutcome, ScoreSubmission, TournamentRecord, TournamentStatus,
};
pub use store::{BracketStore, MemoryStore};
