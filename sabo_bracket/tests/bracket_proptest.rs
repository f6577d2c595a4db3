/// Property-based tests for bracket progression using proptest
///
/// These tests verify that any field size, format and seeding, played in any
/// order the READY queue allows, ends with a single champion and a
/// consistent graph.
use proptest::prelude::*;
use sabo_bracket::bracket::{
    self, Bracket, BracketError, BracketFormat, MatchStatus, Participant, SeedingMethod,
};
use std::collections::HashSet;
use uuid::Uuid;

// Strategy for a format and a field size it accepts
fn format_and_size() -> impl Strategy<Value = (BracketFormat, usize)> {
    prop_oneof![
        (2usize..=16).prop_map(|n| (BracketFormat::SingleElim, n)),
        (4usize..=16).prop_map(|n| (BracketFormat::SaboDouble, n)),
    ]
}

fn seeding_strategy() -> impl Strategy<Value = SeedingMethod> {
    prop_oneof![
        Just(SeedingMethod::Ranked),
        Just(SeedingMethod::AsListed),
        any::<u64>().prop_map(|seed| SeedingMethod::Shuffled { seed }),
    ]
}

fn build(format: BracketFormat, n: usize, seeding: SeedingMethod) -> (Vec<Participant>, Bracket) {
    let players: Vec<Participant> = (1..=n)
        .map(|seed| Participant::new(Uuid::new_v4(), seed as u32))
        .collect();
    let b = bracket::build(Uuid::new_v4(), &players, format, seeding).unwrap();
    (players, b)
}

proptest! {
    #[test]
    fn test_any_play_order_terminates_with_champion(
        (format, n) in format_and_size(),
        seeding in seeding_strategy(),
        picks in prop::collection::vec((any::<usize>(), any::<bool>()), 1..64),
    ) {
        let (players, mut b) = build(format, n, seeding);
        let total = b.matches().len();
        let mut step = 0;

        loop {
            let ready: Vec<_> = b.next_queue().map(|m| m.id).collect();
            if ready.is_empty() {
                break;
            }
            prop_assert!(step < total, "more submissions than matches");

            let (index, slot1_wins) = picks[step % picks.len()];
            let id = ready[index % ready.len()];
            let (s1, s2) = if slot1_wins { (3, 1) } else { (0, 2) };
            b.submit_score(id, s1, s2).unwrap();
            step += 1;
        }

        prop_assert!(b.is_complete());
        prop_assert!(b.matches().iter().all(|m| m.status == MatchStatus::Completed));
        prop_assert!(b.validate().is_ok());

        let champion = b.champion().unwrap();
        prop_assert!(players.iter().any(|p| p.id == champion));

        let standings = b.standings().unwrap();
        prop_assert_eq!(standings.len(), n);
        let unique: HashSet<_> = standings.iter().map(|s| s.participant).collect();
        prop_assert_eq!(unique.len(), n);
        prop_assert_eq!(standings[0].participant, champion);
        for (idx, s) in standings.iter().enumerate() {
            prop_assert_eq!(s.position as usize, idx + 1);
            prop_assert!(s.shared_position <= s.position);
        }
    }

    #[test]
    fn test_rejected_submissions_leave_graph_untouched(
        (format, n) in format_and_size(),
        attempts in prop::collection::vec((1u32..40, -3i32..10, -3i32..10), 1..32),
    ) {
        let (_, mut b) = build(format, n, SeedingMethod::Ranked);

        for (id, s1, s2) in attempts {
            let before = b.clone();
            match b.submit_score(id, s1, s2) {
                Ok(update) => {
                    prop_assert_eq!(update.completed.id, id);
                    prop_assert_eq!(update.completed.status, MatchStatus::Completed);
                }
                Err(err) => {
                    prop_assert_eq!(&b, &before);
                    let local_failure = matches!(
                        err,
                        BracketError::MatchNotFound(_)
                            | BracketError::AlreadyCompleted(_)
                            | BracketError::NotReady { .. }
                            | BracketError::InvalidScore { .. }
                    );
                    prop_assert!(local_failure, "unexpected error: {}", err);
                }
            }
            prop_assert!(b.validate().is_ok());
        }
    }

    #[test]
    fn test_build_is_deterministic(
        (format, n) in format_and_size(),
        seed in any::<u64>(),
    ) {
        let players: Vec<Participant> = (1..=n)
            .map(|s| Participant::new(Uuid::new_v4(), s as u32))
            .collect();
        let tid = Uuid::new_v4();
        let seeding = SeedingMethod::Shuffled { seed };

        let a = bracket::build(tid, &players, format, seeding).unwrap();
        let b = bracket::build(tid, &players, format, seeding).unwrap();
        prop_assert_eq!(a.matches(), b.matches());

        let expected = match format {
            BracketFormat::SingleElim => a.size - 1,
            BracketFormat::SaboDouble => 2 * a.size - 2,
        };
        prop_assert_eq!(a.matches().len(), expected);
    }
}
