//! Score-driven progression over a built bracket.
//!
//! A submission is fully validated before anything is written, so a rejected
//! call leaves the graph untouched. Accepted results are pushed downstream
//! through a work queue: filling a slot may make the next match READY, or
//! complete it immediately when the other side is a permanent bye, which in
//! turn fills further slots.

use super::{
    errors::{BracketError, BracketResult},
    models::{
        Bracket, BracketBranch, BracketFormat, Match, MatchId, MatchScore, MatchStatus,
        ParticipantId, ScoreUpdate, Slot, SlotPosition, SlotRef, Standing,
    },
};
use std::collections::{HashSet, VecDeque};

/// Outcome waiting to be written into a match
#[derive(Debug, Clone, Copy)]
struct Outcome {
    match_id: MatchId,
    winner: Option<ParticipantId>,
    loser: Option<ParticipantId>,
    scores: Option<MatchScore>,
}

impl Bracket {
    /// Record a played result
    ///
    /// # Arguments
    ///
    /// * `match_id` - Match to score
    /// * `score1` - Score of the participant in slot 1
    /// * `score2` - Score of the participant in slot 2
    ///
    /// # Returns
    ///
    /// * `BracketResult<ScoreUpdate>` - The completed match and every downstream
    ///   match that changed
    ///
    /// # Errors
    ///
    /// * `MatchNotFound` - unknown id
    /// * `AlreadyCompleted` - outcome already recorded
    /// * `NotReady` - a slot is still waiting on another match
    /// * `InvalidScore` - tie or negative value
    pub fn submit_score(
        &mut self,
        match_id: MatchId,
        score1: i32,
        score2: i32,
    ) -> BracketResult<ScoreUpdate> {
        let m = self.get(match_id).ok_or(BracketError::MatchNotFound(match_id))?;

        match m.status {
            MatchStatus::Completed => return Err(BracketError::AlreadyCompleted(match_id)),
            MatchStatus::Pending => {
                return Err(BracketError::NotReady {
                    match_id,
                    status: m.status,
                });
            }
            MatchStatus::Ready => {}
        }

        if score1 < 0 || score2 < 0 {
            return Err(BracketError::InvalidScore {
                score1,
                score2,
                reason: "scores must be non-negative",
            });
        }
        if score1 == score2 {
            return Err(BracketError::InvalidScore {
                score1,
                score2,
                reason: "ties must be resolved before submission",
            });
        }

        let (Some(first), Some(second)) = (m.slot1.participant(), m.slot2.participant()) else {
            return Err(BracketError::CorruptTopology(format!(
                "Match {} is READY without two participants",
                match_id
            )));
        };

        let (winner, loser) = if score1 > score2 {
            (first, second)
        } else {
            (second, first)
        };

        let touched = self.apply(Outcome {
            match_id,
            winner: Some(winner),
            loser: Some(loser),
            scores: Some(MatchScore {
                slot1: score1 as u32,
                slot2: score2 as u32,
            }),
        });

        log::debug!(
            "Tournament {} match {} ({}) scored {}-{}, winner {}",
            self.tournament_id,
            match_id,
            self.matches[match_id as usize - 1].branch,
            score1,
            score2,
            winner
        );

        if self.is_complete() {
            log::info!(
                "Tournament {} bracket finished, champion {}",
                self.tournament_id,
                winner
            );
        }

        let completed = self.matches[match_id as usize - 1].clone();
        let advanced = touched
            .into_iter()
            .filter_map(|id| self.get(id).cloned())
            .collect();

        Ok(ScoreUpdate {
            completed,
            advanced,
        })
    }

    /// Matches that can be played now, in id order
    ///
    /// Each call starts a fresh pass over the arena.
    pub fn next_queue(&self) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Ready)
    }

    /// Whether the final has an outcome
    pub fn is_complete(&self) -> bool {
        self.get(self.final_match)
            .is_some_and(|m| m.status == MatchStatus::Completed)
    }

    /// Winner of the final, once played
    pub fn champion(&self) -> Option<ParticipantId> {
        self.get(self.final_match).and_then(|m| m.winner)
    }

    /// Final standings: champion, runner-up, then by elimination stage
    ///
    /// Participants knocked out in the same stage share a
    /// `shared_position` and are ordered by seed.
    ///
    /// # Errors
    ///
    /// * `NotFinished` - the final has not been played
    pub fn standings(&self) -> BracketResult<Vec<Standing>> {
        let champion = match self.get(self.final_match) {
            Some(m) if m.status == MatchStatus::Completed => m.winner.ok_or_else(|| {
                BracketError::CorruptTopology("Final completed without a winner".to_string())
            })?,
            _ => return Err(BracketError::NotFinished),
        };

        let seed_of = |id: ParticipantId| self.participant(id).map(|p| p.seed).unwrap_or(u32::MAX);

        let mut standings = vec![Standing {
            position: 1,
            shared_position: 1,
            participant: champion,
            seed: seed_of(champion),
            eliminated_in: None,
        }];

        let mut eliminations: Vec<(u32, u32, ParticipantId, MatchId)> = self
            .matches
            .iter()
            .filter(|m| m.loser_to.is_none())
            .filter_map(|m| {
                m.loser
                    .map(|loser| (stage_rank(m.branch), m.round_number, loser, m.id))
            })
            .collect();
        // Later stages first; seed breaks ties inside a stage
        eliminations.sort_by_key(|&(stage, round, loser, _)| {
            (std::cmp::Reverse((stage, round)), seed_of(loser))
        });

        let mut position = 2;
        let mut shared_position = 2;
        let mut current_stage = None;
        for (stage, round, participant, match_id) in eliminations {
            if current_stage != Some((stage, round)) {
                current_stage = Some((stage, round));
                shared_position = position;
            }
            standings.push(Standing {
                position,
                shared_position,
                participant,
                seed: seed_of(participant),
                eliminated_in: Some(match_id),
            });
            position += 1;
        }

        Ok(standings)
    }

    /// Check that the graph is a consistent bracket
    ///
    /// Used on brackets read back from storage before they are trusted.
    ///
    /// # Errors
    ///
    /// * `CorruptTopology` - describing the first inconsistency found
    pub fn validate(&self) -> BracketResult<()> {
        let corrupt = |msg: String| Err(BracketError::CorruptTopology(msg));

        let expected = match self.format {
            BracketFormat::SingleElim => self.size.saturating_sub(1),
            BracketFormat::SaboDouble => (2 * self.size).saturating_sub(2),
        };
        if !self.size.is_power_of_two() || self.matches.len() != expected {
            return corrupt(format!(
                "{} matches for a {} bracket of size {}",
                self.matches.len(),
                self.format,
                self.size
            ));
        }

        for (idx, m) in self.matches.iter().enumerate() {
            if m.id as usize != idx + 1 {
                return corrupt(format!("Match at index {} has id {}", idx, m.id));
            }

            for target in [m.winner_to, m.loser_to].into_iter().flatten() {
                if target.match_id <= m.id || self.get(target.match_id).is_none() {
                    return corrupt(format!(
                        "Match {} feeds invalid match {}",
                        m.id, target.match_id
                    ));
                }
            }

            for position in [SlotPosition::First, SlotPosition::Second] {
                let here = SlotRef {
                    match_id: m.id,
                    position,
                };
                let wired = match *m.slot(position) {
                    Slot::WinnerOf(source) => self.get(source).map(|s| (s, s.winner_to)),
                    Slot::LoserOf(source) => self.get(source).map(|s| (s, s.loser_to)),
                    Slot::Participant(_) | Slot::Bye => continue,
                };
                match wired {
                    Some((source, Some(edge))) if edge == here => {
                        if source.status == MatchStatus::Completed {
                            return corrupt(format!(
                                "Match {} completed but slot in match {} unresolved",
                                source.id, m.id
                            ));
                        }
                    }
                    _ => {
                        return corrupt(format!("Slot of match {} has no matching back-edge", m.id));
                    }
                }
            }

            let both_present = m.slot1.participant().is_some() && m.slot2.participant().is_some();
            let consistent = match m.status {
                MatchStatus::Pending => !both_present,
                MatchStatus::Ready => both_present && m.winner.is_none(),
                MatchStatus::Completed => m.scores.is_none() || m.winner.is_some(),
            };
            if !consistent {
                return corrupt(format!("Match {} has inconsistent status {}", m.id, m.status));
            }
        }

        match self.get(self.final_match) {
            Some(m) if m.winner_to.is_none() && m.loser_to.is_none() => Ok(()),
            _ => corrupt(format!("Final match {} is not terminal", self.final_match)),
        }
    }

    /// Resolve byes and READY states right after construction
    pub(crate) fn settle_initial(&mut self) {
        let ids: Vec<MatchId> = self.matches.iter().map(|m| m.id).collect();
        for id in ids {
            if let Some(outcome) = self.settle(id) {
                self.apply(outcome);
            }
        }
    }

    /// Write an outcome and propagate it; returns ids of touched downstream
    /// matches in resolution order, without duplicates
    fn apply(&mut self, outcome: Outcome) -> Vec<MatchId> {
        let mut queue = VecDeque::from([outcome]);
        let mut touched = Vec::new();
        let mut seen = HashSet::new();

        while let Some(outcome) = queue.pop_front() {
            let routes = {
                let Ok(m) = self.get_mut(outcome.match_id) else {
                    log::warn!("Dropping outcome for unknown match {}", outcome.match_id);
                    continue;
                };

                m.status = MatchStatus::Completed;
                m.winner = outcome.winner;
                m.loser = outcome.loser;
                m.scores = outcome.scores;

                [(m.winner_to, outcome.winner), (m.loser_to, outcome.loser)]
            };

            if outcome.scores.is_none() {
                log::debug!(
                    "Tournament {} match {} completed by bye",
                    self.tournament_id,
                    outcome.match_id
                );
            }

            for (target, participant) in routes {
                let Some(target) = target else { continue };

                self.fill(target, outcome.match_id, participant);
                if seen.insert(target.match_id) {
                    touched.push(target.match_id);
                }
                if let Some(next) = self.settle(target.match_id) {
                    queue.push_back(next);
                }
            }
        }

        touched
    }

    /// Replace the forward reference in a downstream slot
    fn fill(&mut self, target: SlotRef, source: MatchId, participant: Option<ParticipantId>) {
        let Ok(m) = self.get_mut(target.match_id) else {
            log::warn!("Match {} feeds unknown match {}", source, target.match_id);
            return;
        };

        let slot = m.slot_mut(target.position);
        if slot.source() != Some(source) {
            log::warn!(
                "Match {} slot {:?} expected a reference to match {}, found {:?}",
                target.match_id,
                target.position,
                source,
                slot
            );
            return;
        }

        *slot = participant.map(Slot::Participant).unwrap_or(Slot::Bye);
    }

    /// Move a pending match forward if its slots allow it
    ///
    /// Returns a bye outcome when the match completes without play.
    fn settle(&mut self, match_id: MatchId) -> Option<Outcome> {
        let m = self.get_mut(match_id).ok()?;
        if m.status != MatchStatus::Pending {
            return None;
        }

        let bye = |winner| Outcome {
            match_id,
            winner,
            loser: None,
            scores: None,
        };

        match (m.slot1, m.slot2) {
            (Slot::Participant(_), Slot::Participant(_)) => {
                m.status = MatchStatus::Ready;
                None
            }
            (Slot::Participant(p), Slot::Bye) | (Slot::Bye, Slot::Participant(p)) => Some(bye(Some(p))),
            (Slot::Bye, Slot::Bye) => Some(bye(None)),
            _ => None,
        }
    }
}

/// Ordering of elimination stages; higher finishes better
fn stage_rank(branch: BracketBranch) -> u32 {
    match branch {
        BracketBranch::Final => 3,
        BracketBranch::Semifinal => 2,
        BracketBranch::Winners | BracketBranch::Losers => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{builder::build, models::Participant, models::SeedingMethod};
    use uuid::Uuid;

    fn field(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|seed| Participant::new(Uuid::new_v4(), seed as u32))
            .collect()
    }

    fn bracket(n: usize, format: BracketFormat) -> Bracket {
        build(Uuid::new_v4(), &field(n), format, SeedingMethod::Ranked).unwrap()
    }

    #[test]
    fn test_submit_score_advances_winner() {
        let mut b = bracket(4, BracketFormat::SingleElim);
        let slot1 = b.get(1).unwrap().slot1.participant().unwrap();

        let update = b.submit_score(1, 8, 2).unwrap();
        assert_eq!(update.completed.status, MatchStatus::Completed);
        assert_eq!(update.completed.winner, Some(slot1));
        assert_eq!(
            update.completed.scores,
            Some(MatchScore { slot1: 8, slot2: 2 })
        );
        assert_eq!(update.advanced.len(), 1);
        assert_eq!(b.get(3).unwrap().slot1, Slot::Participant(slot1));
        assert_eq!(b.get(3).unwrap().status, MatchStatus::Pending);
    }

    #[test]
    fn test_second_slot_can_win() {
        let mut b = bracket(2, BracketFormat::SingleElim);
        let slot2 = b.get(1).unwrap().slot2.participant().unwrap();

        b.submit_score(1, 1, 3).unwrap();
        assert_eq!(b.champion(), Some(slot2));
        assert!(b.is_complete());
    }

    #[test]
    fn test_rejects_tie_and_negative_without_change() {
        let mut b = bracket(4, BracketFormat::SingleElim);
        let before = b.clone();

        assert!(matches!(
            b.submit_score(1, 3, 3),
            Err(BracketError::InvalidScore { .. })
        ));
        assert!(matches!(
            b.submit_score(1, -1, 3),
            Err(BracketError::InvalidScore { .. })
        ));
        assert_eq!(b, before);
    }

    #[test]
    fn test_rejects_pending_and_unknown_match() {
        let mut b = bracket(4, BracketFormat::SingleElim);

        assert_eq!(
            b.submit_score(3, 2, 1).unwrap_err(),
            BracketError::NotReady {
                match_id: 3,
                status: MatchStatus::Pending
            }
        );
        assert_eq!(
            b.submit_score(99, 2, 1).unwrap_err(),
            BracketError::MatchNotFound(99)
        );
        assert_eq!(
            b.submit_score(0, 2, 1).unwrap_err(),
            BracketError::MatchNotFound(0)
        );
    }

    #[test]
    fn test_resubmission_rejected_and_scores_kept() {
        let mut b = bracket(4, BracketFormat::SaboDouble);
        b.submit_score(1, 8, 2).unwrap();

        assert_eq!(
            b.submit_score(1, 0, 5).unwrap_err(),
            BracketError::AlreadyCompleted(1)
        );
        assert_eq!(
            b.get(1).unwrap().scores,
            Some(MatchScore { slot1: 8, slot2: 2 })
        );
    }

    #[test]
    fn test_double_elim_routes_loser() {
        let mut b = bracket(4, BracketFormat::SaboDouble);
        let m1 = b.get(1).unwrap().clone();
        let loser = m1.slot2.participant().unwrap();

        let update = b.submit_score(1, 8, 2).unwrap();
        assert_eq!(update.advanced.len(), 2);

        let drop = m1.loser_to.unwrap();
        assert_eq!(
            *b.get(drop.match_id).unwrap().slot(drop.position),
            Slot::Participant(loser)
        );
    }

    #[test]
    fn test_next_queue_is_restartable() {
        let mut b = bracket(8, BracketFormat::SingleElim);
        assert_eq!(b.next_queue().count(), 4);
        assert_eq!(b.next_queue().count(), 4);

        b.submit_score(1, 2, 0).unwrap();
        b.submit_score(2, 2, 0).unwrap();
        let ids: Vec<MatchId> = b.next_queue().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_byes_auto_advance_top_seeds() {
        let players = field(3);
        let b = build(
            Uuid::new_v4(),
            &players,
            BracketFormat::SingleElim,
            SeedingMethod::Ranked,
        )
        .unwrap();

        let bye_match = b.get(1).unwrap();
        assert!(bye_match.is_bye());
        assert_eq!(bye_match.winner, Some(players[0].id));
        assert_eq!(b.get(3).unwrap().slot1, Slot::Participant(players[0].id));
        assert_eq!(b.get(2).unwrap().status, MatchStatus::Ready);
    }

    #[test]
    fn test_standings_require_finished_bracket() {
        let b = bracket(4, BracketFormat::SingleElim);
        assert_eq!(b.standings().unwrap_err(), BracketError::NotFinished);
    }

    #[test]
    fn test_single_elim_standings() {
        let players = field(4);
        let mut b = build(
            Uuid::new_v4(),
            &players,
            BracketFormat::SingleElim,
            SeedingMethod::Ranked,
        )
        .unwrap();

        // Slot 1 always wins: seeds 1 and 2 reach the final
        b.submit_score(1, 2, 0).unwrap();
        b.submit_score(2, 2, 0).unwrap();
        b.submit_score(3, 2, 1).unwrap();

        let standings = b.standings().unwrap();
        let order: Vec<ParticipantId> = standings.iter().map(|s| s.participant).collect();
        assert_eq!(
            order,
            vec![players[0].id, players[1].id, players[2].id, players[3].id]
        );
        assert_eq!(standings[2].shared_position, 3);
        assert_eq!(standings[3].shared_position, 3);
        assert_eq!(standings[3].position, 4);
        assert_eq!(standings[0].eliminated_in, None);
    }

    #[test]
    fn test_validate_accepts_fresh_and_played_brackets() {
        let mut b = bracket(8, BracketFormat::SaboDouble);
        assert!(b.validate().is_ok());

        b.submit_score(1, 3, 1).unwrap();
        b.submit_score(2, 3, 1).unwrap();
        assert!(b.validate().is_ok());
    }

    #[test]
    fn test_validate_detects_broken_back_edge() {
        let mut b = bracket(4, BracketFormat::SingleElim);
        b.matches[0].winner_to = None;
        assert!(matches!(
            b.validate(),
            Err(BracketError::CorruptTopology(_))
        ));
    }
}
