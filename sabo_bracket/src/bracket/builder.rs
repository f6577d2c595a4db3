//! Bracket construction.
//!
//! Builds the full match graph up front. Round-1 slots hold seeded
//! participants or byes; every later slot is a forward reference to the
//! winner or loser of an earlier match.
//!
//! ## SABO double elimination layout
//!
//! For a bracket of size `S = 2^k`:
//!
//! - **Winners**: `k` rounds, identical to single elimination. Every winners
//!   match drops its loser into the losers bracket.
//! - **Losers**: for each winners round `i` in `2..=k`, two losers rounds:
//!   an absorb round (`2i-3`) where losers-bracket survivors meet each other
//!   (round 1 takes the winners round-1 losers pairwise), then a drop round
//!   (`2i-2`) where each absorb winner meets a fresh loser from winners
//!   round `i`. Drops enter reversed on odd passes and in bracket order on
//!   even passes. The first reversal already sends each drop to the opposite
//!   half, so crossing again would bring winners-bracket opponents back
//!   together.
//! - **Semifinal**: the last drop round. The losers-bracket finalist meets the
//!   loser of the winners final.
//! - **Final**: winners-bracket champion against the semifinal winner. No reset.
//!
//! Totals: `S-1` winners, `S-3` losers, one semifinal, one final: `2S-2`.

use super::{
    errors::{BracketError, BracketResult},
    models::{
        Bracket, BracketBranch, BracketFormat, Match, MatchId, Participant, SeedingMethod, Slot,
        SlotPosition, SlotRef, TournamentId,
    },
};
use crate::config::EngineConfig;
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::collections::HashSet;

/// Build a bracket with the default engine configuration
///
/// # Arguments
///
/// * `tournament_id` - Tournament the bracket belongs to
/// * `participants` - Confirmed participants
/// * `format` - Elimination format
/// * `seeding` - How the list is turned into seeds
///
/// # Errors
///
/// * `InsufficientParticipants` - below the format minimum
/// * `UnsupportedSize` - above the largest seeding table
/// * `DuplicateParticipant` - same id listed twice
pub fn build(
    tournament_id: TournamentId,
    participants: &[Participant],
    format: BracketFormat,
    seeding: SeedingMethod,
) -> BracketResult<Bracket> {
    build_with_config(
        tournament_id,
        participants,
        format,
        seeding,
        &EngineConfig::default(),
    )
}

/// Build a bracket with explicit size limits
///
/// Same inputs always produce the same topology and seeding.
///
/// # Errors
///
/// See [`build`].
pub fn build_with_config(
    tournament_id: TournamentId,
    participants: &[Participant],
    format: BracketFormat,
    seeding: SeedingMethod,
    config: &EngineConfig,
) -> BracketResult<Bracket> {
    let needed = config.min_participants(format);
    if participants.len() < needed {
        return Err(BracketError::InsufficientParticipants {
            format,
            needed,
            current: participants.len(),
        });
    }

    if participants.len() > config.max_bracket_size {
        return Err(BracketError::UnsupportedSize {
            format,
            count: participants.len(),
            max: config.max_bracket_size,
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.id) {
            return Err(BracketError::DuplicateParticipant(participant.id));
        }
    }

    let seeded = seed_participants(participants, seeding);
    let size = bracket_size(seeded.len());

    let mut graph = GraphBuilder::default();
    let winners_rounds = graph.winners_bracket(&seeded, size, format);
    let final_match = match format {
        BracketFormat::SingleElim => *winners_rounds
            .last()
            .and_then(|round| round.first())
            .ok_or_else(|| BracketError::CorruptTopology("Missing final".to_string()))?,
        BracketFormat::SaboDouble => graph.losers_bracket_and_finals(&winners_rounds)?,
    };

    let mut bracket = Bracket {
        tournament_id,
        format,
        seeding,
        size,
        participants: seeded,
        matches: graph.matches,
        final_match,
        generated_at: Utc::now(),
    };
    bracket.settle_initial();

    log::info!(
        "Built {} bracket for tournament {}: {} participants, size {}, {} matches",
        format,
        tournament_id,
        bracket.participants.len(),
        size,
        bracket.matches.len()
    );

    Ok(bracket)
}

/// Order participants by the seeding method and renumber seeds `1..=n`
pub fn seed_participants(participants: &[Participant], method: SeedingMethod) -> Vec<Participant> {
    let mut ordered = participants.to_vec();

    match method {
        SeedingMethod::Ranked => ordered.sort_by_key(|p| p.seed),
        SeedingMethod::AsListed => {}
        SeedingMethod::Shuffled { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            ordered.shuffle(&mut rng);
        }
    }

    for (idx, participant) in ordered.iter_mut().enumerate() {
        participant.seed = idx as u32 + 1;
    }

    ordered
}

/// Smallest power of two holding `count` entrants (at least 2)
pub fn bracket_size(count: usize) -> usize {
    count.max(2).next_power_of_two()
}

/// Round-1 seed order for a power-of-two bracket
///
/// Adjacent pairs are opponents: `[1, 8, 4, 5, 2, 7, 3, 6]` for size 8, so
/// the top seeds can only meet in the last round and face byes first.
pub fn seed_positions(size: usize) -> Vec<u32> {
    let mut seeds = vec![1u32];
    while seeds.len() < size {
        let n = seeds.len() as u32;
        let mut next = Vec::with_capacity(seeds.len() * 2);
        for seed in seeds.iter().copied() {
            next.push(seed);
            next.push(n * 2 + 1 - seed);
        }
        seeds = next;
    }
    seeds
}

/// Arena under construction
#[derive(Default)]
struct GraphBuilder {
    matches: Vec<Match>,
}

impl GraphBuilder {
    /// Append a match and wire the back-edges of any referenced sources
    fn push(
        &mut self,
        round_number: u32,
        match_number: u32,
        branch: BracketBranch,
        slot1: Slot,
        slot2: Slot,
    ) -> MatchId {
        let id = self.matches.len() as MatchId + 1;

        for (slot, position) in [(slot1, SlotPosition::First), (slot2, SlotPosition::Second)] {
            let target = SlotRef {
                match_id: id,
                position,
            };
            match slot {
                Slot::WinnerOf(source) => self.matches[source as usize - 1].winner_to = Some(target),
                Slot::LoserOf(source) => self.matches[source as usize - 1].loser_to = Some(target),
                Slot::Participant(_) | Slot::Bye => {}
            }
        }

        self.matches
            .push(Match::new(id, round_number, match_number, branch, slot1, slot2));
        id
    }

    /// Winners bracket; returns match ids per round
    fn winners_bracket(
        &mut self,
        seeded: &[Participant],
        size: usize,
        format: BracketFormat,
    ) -> Vec<Vec<MatchId>> {
        let rounds = size.trailing_zeros();
        let branch_for = |round: u32| match format {
            BracketFormat::SingleElim if round == rounds => BracketBranch::Final,
            BracketFormat::SingleElim | BracketFormat::SaboDouble => BracketBranch::Winners,
        };

        let seat = |seed: u32| {
            seeded
                .get(seed as usize - 1)
                .map(|p| Slot::Participant(p.id))
                .unwrap_or(Slot::Bye)
        };

        let seeds = seed_positions(size);
        let mut winners_rounds: Vec<Vec<MatchId>> = Vec::with_capacity(rounds as usize);

        let first_round = seeds
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| self.push(1, i as u32 + 1, branch_for(1), seat(pair[0]), seat(pair[1])))
            .collect();
        winners_rounds.push(first_round);

        for round in 2..=rounds {
            let previous = winners_rounds[round as usize - 2].clone();
            let ids = previous
                .chunks(2)
                .enumerate()
                .map(|(i, pair)| {
                    self.push(
                        round,
                        i as u32 + 1,
                        branch_for(round),
                        Slot::WinnerOf(pair[0]),
                        Slot::WinnerOf(pair[1]),
                    )
                })
                .collect();
            winners_rounds.push(ids);
        }

        winners_rounds
    }

    /// Losers bracket, semifinal and final; returns the final's id
    fn losers_bracket_and_finals(&mut self, winners_rounds: &[Vec<MatchId>]) -> BracketResult<MatchId> {
        let rounds = winners_rounds.len();
        if rounds < 2 {
            return Err(BracketError::CorruptTopology(
                "Double elimination needs at least two winners rounds".to_string(),
            ));
        }

        let mut survivors: Vec<Slot> = winners_rounds[0].iter().map(|&id| Slot::LoserOf(id)).collect();
        let mut semifinal = None;

        for pass in 1..rounds {
            let absorb_round = (2 * pass - 1) as u32;
            let absorb_ids: Vec<MatchId> = survivors
                .chunks(2)
                .enumerate()
                .map(|(j, pair)| {
                    self.push(absorb_round, j as u32 + 1, BracketBranch::Losers, pair[0], pair[1])
                })
                .collect();

            let drops = drop_order(&winners_rounds[pass], pass);
            let last_pass = pass == rounds - 1;
            let (branch, drop_round) = if last_pass {
                (BracketBranch::Semifinal, 1)
            } else {
                (BracketBranch::Losers, (2 * pass) as u32)
            };

            let drop_ids: Vec<MatchId> = absorb_ids
                .iter()
                .zip(drops)
                .enumerate()
                .map(|(j, (&absorbed, dropped))| {
                    self.push(
                        drop_round,
                        j as u32 + 1,
                        branch,
                        Slot::WinnerOf(absorbed),
                        Slot::LoserOf(dropped),
                    )
                })
                .collect();

            if last_pass {
                semifinal = drop_ids.first().copied();
            }
            survivors = drop_ids.into_iter().map(Slot::WinnerOf).collect();
        }

        let semifinal = semifinal
            .ok_or_else(|| BracketError::CorruptTopology("Missing semifinal".to_string()))?;
        let winners_final = *winners_rounds[rounds - 1]
            .first()
            .ok_or_else(|| BracketError::CorruptTopology("Missing winners final".to_string()))?;

        Ok(self.push(
            1,
            1,
            BracketBranch::Final,
            Slot::WinnerOf(winners_final),
            Slot::WinnerOf(semifinal),
        ))
    }
}

/// Order in which a winners round's losers enter the losers bracket
fn drop_order(round: &[MatchId], pass: usize) -> Vec<MatchId> {
    let mut order = round.to_vec();
    if pass % 2 == 1 {
        order.reverse();
    }
    order
}
