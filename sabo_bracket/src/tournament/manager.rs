//! Tournament manager: the entry points hosts call.
//!
//! Holds one lock per tournament bracket. Score submissions for a tournament
//! are applied one at a time under that lock, so no downstream slot can be
//! resolved by two racing completions. Generation runs under the map's write
//! lock and returns an existing bracket instead of building a second one.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{BracketGeneration, ScoreOutcome, ScoreSubmission, TournamentRecord},
    store::BracketStore,
};
use crate::{
    bracket::{Bracket, Match, Participant, SeedingMethod, Standing, TournamentId, build_with_config},
    config::EngineConfig,
    prize::{Award, PrizeOverrides, PrizeSchedule, distribute},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    /// External persistence
    store: Arc<dyn BracketStore>,

    /// Engine limits and defaults
    config: EngineConfig,

    /// Live brackets, one lock each
    brackets: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<Bracket>>>>>,
}

impl TournamentManager {
    /// Create a new tournament manager
    ///
    /// # Arguments
    ///
    /// * `store` - Bracket persistence
    /// * `config` - Engine configuration
    pub fn new(store: Arc<dyn BracketStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            brackets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Engine configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate the bracket for a tournament
    ///
    /// Idempotent: if a bracket already exists in memory or in the store it
    /// is returned unchanged with `created == false`, whatever the request.
    ///
    /// # Arguments
    ///
    /// * `record` - Tournament record (format, status, confirmed count)
    /// * `participants` - Confirmed participants
    /// * `seeding` - Seeding method
    ///
    /// # Errors
    ///
    /// * `InvalidState` - tournament is not in a pre-play status
    /// * `ParticipantCountMismatch` - list length differs from the confirmed count
    /// * `Bracket` - builder rejected the field
    /// * `Store` - persistence failed; nothing is kept in memory
    pub async fn generate_bracket(
        &self,
        record: &TournamentRecord,
        participants: &[Participant],
        seeding: SeedingMethod,
    ) -> TournamentResult<BracketGeneration> {
        if let Some(existing) = self.cached(record.id).await {
            return Ok(self.existing(record, existing).await);
        }

        let mut brackets = self.brackets.write().await;

        // Another caller may have won the race for the write lock
        if let Some(existing) = brackets.get(&record.id).cloned() {
            return Ok(self.existing(record, existing).await);
        }

        if let Some(stored) = self.store.load(record.id).await? {
            stored.validate()?;
            let handle = Arc::new(Mutex::new(stored));
            brackets.insert(record.id, handle.clone());
            return Ok(self.existing(record, handle).await);
        }

        if !record.status.can_start_play() {
            return Err(TournamentError::InvalidState {
                actual: record.status,
            });
        }

        if participants.len() != record.confirmed_participants {
            return Err(TournamentError::ParticipantCountMismatch {
                confirmed: record.confirmed_participants,
                provided: participants.len(),
            });
        }

        let bracket = build_with_config(
            record.id,
            participants,
            record.format,
            seeding,
            &self.config,
        )?;
        self.store.save(&bracket).await?;
        brackets.insert(record.id, Arc::new(Mutex::new(bracket.clone())));

        log::info!(
            "Generated bracket for tournament {} '{}'",
            record.id,
            record.name
        );

        Ok(BracketGeneration {
            bracket,
            created: true,
        })
    }

    /// Submit a score for one match
    ///
    /// The submission is applied to a copy and only committed once the
    /// changed matches are persisted, so a failure at any step leaves both
    /// the live bracket and the store untouched.
    ///
    /// # Errors
    ///
    /// * `NotFound` - no bracket for the tournament
    /// * `Bracket` - `AlreadyCompleted`, `NotReady`, `InvalidScore`, `MatchNotFound`
    /// * `Store` - persistence failed
    pub async fn submit_score(
        &self,
        tournament_id: TournamentId,
        submission: ScoreSubmission,
    ) -> TournamentResult<ScoreOutcome> {
        let handle = self.handle(tournament_id).await?;
        let mut bracket = handle.lock().await;

        let mut next = bracket.clone();
        let update = match next.submit_score(submission.match_id, submission.score1, submission.score2)
        {
            Ok(update) => update,
            Err(e) => {
                log::warn!(
                    "Rejected score {}-{} for tournament {} match {}: {}",
                    submission.score1,
                    submission.score2,
                    tournament_id,
                    submission.match_id,
                    e
                );
                return Err(e.into());
            }
        };

        let changed: Vec<Match> = update.changed_matches().cloned().collect();
        self.store.save_matches(tournament_id, &changed).await?;
        *bracket = next;

        let standings = if bracket.is_complete() {
            Some(bracket.standings()?)
        } else {
            None
        };

        Ok(ScoreOutcome { update, standings })
    }

    /// Snapshot of a tournament's bracket
    pub async fn bracket(&self, tournament_id: TournamentId) -> TournamentResult<Bracket> {
        let handle = self.handle(tournament_id).await?;
        let bracket = handle.lock().await;
        Ok(bracket.clone())
    }

    /// Matches that can be played now
    pub async fn ready_matches(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Match>> {
        let handle = self.handle(tournament_id).await?;
        let bracket = handle.lock().await;
        Ok(bracket.next_queue().cloned().collect())
    }

    /// Final standings of a finished tournament
    pub async fn standings(&self, tournament_id: TournamentId) -> TournamentResult<Vec<Standing>> {
        let handle = self.handle(tournament_id).await?;
        let bracket = handle.lock().await;
        Ok(bracket.standings()?)
    }

    /// Prize schedule for a pool, using the configured default profile when
    /// none is given
    pub fn prize_schedule(
        &self,
        pool_total: i64,
        profile: Option<&str>,
        overrides: Option<PrizeOverrides>,
    ) -> TournamentResult<PrizeSchedule> {
        let profile = profile.unwrap_or(&self.config.default_prize_profile);
        Ok(distribute(pool_total, profile, overrides)?)
    }

    /// Awards for every placed participant of a finished tournament
    pub async fn awards(
        &self,
        tournament_id: TournamentId,
        pool_total: i64,
        profile: Option<&str>,
        overrides: Option<PrizeOverrides>,
    ) -> TournamentResult<Vec<Award>> {
        let schedule = self.prize_schedule(pool_total, profile, overrides)?;
        let standings = self.standings(tournament_id).await?;
        Ok(schedule.award(&standings))
    }

    /// Drop a bracket from memory; the store keeps it
    pub async fn evict(&self, tournament_id: TournamentId) -> bool {
        self.brackets.write().await.remove(&tournament_id).is_some()
    }

    async fn cached(&self, tournament_id: TournamentId) -> Option<Arc<Mutex<Bracket>>> {
        self.brackets.read().await.get(&tournament_id).cloned()
    }

    /// Live bracket handle, loading from the store on a cache miss
    async fn handle(&self, tournament_id: TournamentId) -> TournamentResult<Arc<Mutex<Bracket>>> {
        if let Some(handle) = self.cached(tournament_id).await {
            return Ok(handle);
        }

        let mut brackets = self.brackets.write().await;
        if let Some(handle) = brackets.get(&tournament_id) {
            return Ok(handle.clone());
        }

        let stored = self
            .store
            .load(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;
        stored.validate()?;

        let handle = Arc::new(Mutex::new(stored));
        brackets.insert(tournament_id, handle.clone());
        Ok(handle)
    }

    async fn existing(
        &self,
        record: &TournamentRecord,
        handle: Arc<Mutex<Bracket>>,
    ) -> BracketGeneration {
        let bracket = handle.lock().await.clone();
        if bracket.format != record.format {
            log::warn!(
                "Tournament {} already has a {} bracket, ignoring {} request",
                record.id,
                bracket.format,
                record.format
            );
        } else {
            log::debug!("Bracket for tournament {} already exists", record.id);
        }
        BracketGeneration {
            bracket,
            created: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bracket::{BracketError, BracketFormat},
        tournament::{models::TournamentStatus, store::MemoryStore},
    };
    use uuid::Uuid;

    fn field(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|seed| Participant::new(Uuid::new_v4(), seed as u32))
            .collect()
    }

    fn manager() -> TournamentManager {
        TournamentManager::new(Arc::new(MemoryStore::new()), EngineConfig::default())
    }

    fn record(n: usize, format: BracketFormat) -> TournamentRecord {
        TournamentRecord::new(Uuid::new_v4(), "Weekly 9-ball".to_string(), format).with_confirmed(n)
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let mgr = manager();
        let rec = record(8, BracketFormat::SaboDouble);
        let players = field(8);

        let first = mgr
            .generate_bracket(&rec, &players, SeedingMethod::Ranked)
            .await
            .unwrap();
        assert!(first.created);

        let second = mgr
            .generate_bracket(&rec, &field(8), SeedingMethod::AsListed)
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.bracket, first.bracket);
    }

    #[tokio::test]
    async fn test_generate_rejects_started_tournament() {
        let mgr = manager();
        let mut rec = record(4, BracketFormat::SingleElim);
        rec.status = TournamentStatus::Completed;

        let err = mgr
            .generate_bracket(&rec, &field(4), SeedingMethod::Ranked)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_count_mismatch() {
        let mgr = manager();
        let rec = record(6, BracketFormat::SingleElim);

        let err = mgr
            .generate_bracket(&rec, &field(5), SeedingMethod::Ranked)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::ParticipantCountMismatch {
                confirmed: 6,
                provided: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_generate_surfaces_insufficient_participants() {
        let mgr = manager();
        let rec = record(3, BracketFormat::SaboDouble);

        let err = mgr
            .generate_bracket(&rec, &field(3), SeedingMethod::Ranked)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Bracket(BracketError::InsufficientParticipants { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_unknown_tournament() {
        let mgr = manager();
        let err = mgr
            .submit_score(Uuid::new_v4(), ScoreSubmission::new(1, 2, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_state() {
        let mgr = manager();
        let rec = record(4, BracketFormat::SingleElim);
        mgr.generate_bracket(&rec, &field(4), SeedingMethod::Ranked)
            .await
            .unwrap();
        let before = mgr.bracket(rec.id).await.unwrap();

        let err = mgr
            .submit_score(rec.id, ScoreSubmission::new(1, 4, 4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Bracket(BracketError::InvalidScore { .. })
        ));
        assert_eq!(mgr.bracket(rec.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_evicted_bracket_reloads_from_store() {
        let mgr = manager();
        let rec = record(4, BracketFormat::SingleElim);
        mgr.generate_bracket(&rec, &field(4), SeedingMethod::Ranked)
            .await
            .unwrap();
        mgr.submit_score(rec.id, ScoreSubmission::new(1, 3, 0))
            .await
            .unwrap();

        assert!(mgr.evict(rec.id).await);
        let reloaded = mgr.bracket(rec.id).await.unwrap();
        assert!(reloaded.get(1).unwrap().scores.is_some());
        assert_eq!(mgr.ready_matches(rec.id).await.unwrap().len(), 1);
    }

    #[test]
    fn test_prize_schedule_uses_default_profile() {
        let mgr = manager();
        let schedule = mgr.prize_schedule(1_000, None, None).unwrap();
        assert_eq!(schedule.profile, "standard");

        let err = mgr.prize_schedule(1_000, Some("nope"), None).unwrap_err();
        assert!(matches!(err, TournamentError::Prize(_)));
    }

    #[test]
    fn test_client_message_hides_store_details() {
        let err = TournamentError::Store(crate::tournament::errors::StoreError::Backend(
            "connection refused at 10.0.0.3".to_string(),
        ));
        assert_eq!(err.client_message(), "Internal server error");
    }
}
