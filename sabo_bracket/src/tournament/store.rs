//! Bracket persistence seam.
//!
//! The engine never owns a storage format. Hosts implement [`BracketStore`]
//! over their own tables: read a full graph in, write changed matches out.

use super::errors::{StoreError, StoreResult};
use crate::bracket::{Bracket, Match, TournamentId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence operations the tournament manager needs
#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Load the full bracket for a tournament, if one was saved
    async fn load(&self, tournament_id: TournamentId) -> StoreResult<Option<Bracket>>;

    /// Save a newly generated bracket
    async fn save(&self, bracket: &Bracket) -> StoreResult<()>;

    /// Overwrite the given matches of an existing bracket
    async fn save_matches(&self, tournament_id: TournamentId, matches: &[Match]) -> StoreResult<()>;
}

/// In-process store keeping JSON snapshots
///
/// Round-trips every write through serde so anything it accepts is also
/// representable by an external store.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<TournamentId, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored brackets
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Whether nothing has been stored
    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl BracketStore for MemoryStore {
    async fn load(&self, tournament_id: TournamentId) -> StoreResult<Option<Bracket>> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .get(&tournament_id)
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .transpose()
    }

    async fn save(&self, bracket: &Bracket) -> StoreResult<()> {
        let json = serde_json::to_string(bracket)?;
        self.snapshots
            .write()
            .await
            .insert(bracket.tournament_id, json);
        Ok(())
    }

    async fn save_matches(&self, tournament_id: TournamentId, matches: &[Match]) -> StoreResult<()> {
        let mut snapshots = self.snapshots.write().await;
        let json = snapshots
            .get(&tournament_id)
            .ok_or(StoreError::NotFound(tournament_id))?;

        let mut bracket: Bracket = serde_json::from_str(json)?;
        for updated in matches {
            let slot = updated
                .id
                .checked_sub(1)
                .and_then(|idx| bracket.matches.get_mut(idx as usize))
                .ok_or_else(|| {
                    StoreError::Backend(format!(
                        "Match {} does not exist in tournament {}",
                        updated.id, tournament_id
                    ))
                })?;
            *slot = updated.clone();
        }

        snapshots.insert(tournament_id, serde_json::to_string(&bracket)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{BracketFormat, MatchStatus, Participant, SeedingMethod, build};
    use uuid::Uuid;

    fn sample() -> Bracket {
        let players: Vec<Participant> = (1..=4)
            .map(|seed| Participant::new(Uuid::new_v4(), seed))
            .collect();
        build(
            Uuid::new_v4(),
            &players,
            BracketFormat::SaboDouble,
            SeedingMethod::Ranked,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = MemoryStore::new();
        let bracket = sample();

        assert!(store.load(bracket.tournament_id).await.unwrap().is_none());
        store.save(&bracket).await.unwrap();

        let loaded = store.load(bracket.tournament_id).await.unwrap().unwrap();
        assert_eq!(loaded, bracket);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_matches_writes_delta() {
        let store = MemoryStore::new();
        let mut bracket = sample();
        store.save(&bracket).await.unwrap();

        let update = bracket.submit_score(1, 5, 3).unwrap();
        let changed: Vec<Match> = update.changed_matches().cloned().collect();
        store
            .save_matches(bracket.tournament_id, &changed)
            .await
            .unwrap();

        let loaded = store.load(bracket.tournament_id).await.unwrap().unwrap();
        assert_eq!(loaded.get(1).unwrap().status, MatchStatus::Completed);
        assert_eq!(loaded.matches(), bracket.matches());
    }

    #[tokio::test]
    async fn test_save_matches_requires_saved_bracket() {
        let store = MemoryStore::new();
        let bracket = sample();

        let err = store
            .save_matches(bracket.tournament_id, bracket.matches())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
