//! Prize data models and profile tables.

use super::errors::{PrizeError, PrizeResult};
use crate::bracket::{ParticipantId, Standing};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parts-per-million denominator for profile shares
pub const PPM: i64 = 1_000_000;

/// One finishing position or an inclusive range of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub start: u32,
    pub end: u32,
}

impl PositionRange {
    /// A single position
    pub const fn single(position: u32) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Inclusive range
    pub const fn span(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of positions covered
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Whether the position falls inside the range
    pub fn contains(&self, position: u32) -> bool {
        (self.start..=self.end).contains(&position)
    }
}

impl fmt::Display for PositionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Display grouping of a tier; has no effect on amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierClass {
    /// Positions 1-3
    Podium,
    /// Positions 4-8
    Contender,
    /// Everything below
    Field,
}

impl TierClass {
    /// Classify by the first position of a tier
    pub fn for_position(position: u32) -> Self {
        match position {
            0..=3 => TierClass::Podium,
            4..=8 => TierClass::Contender,
            _ => TierClass::Field,
        }
    }
}

impl fmt::Display for TierClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierClass::Podium => write!(f, "podium"),
            TierClass::Contender => write!(f, "contender"),
            TierClass::Field => write!(f, "field"),
        }
    }
}

/// One row of a profile table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRule {
    pub positions: PositionRange,
    /// Share of the pool for each position in the range, in parts per million
    pub share_ppm: u32,
    /// Fixed ranking points per position
    pub ranking_points: u32,
    /// Fixed loyalty points per position
    pub loyalty_points: u32,
}

impl TierRule {
    const fn new(
        positions: PositionRange,
        share_ppm: u32,
        ranking_points: u32,
        loyalty_points: u32,
    ) -> Self {
        Self {
            positions,
            share_ppm,
            ranking_points,
            loyalty_points,
        }
    }
}

/// Named payout table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeProfile {
    pub name: &'static str,
    /// Rows ordered best position first
    pub rules: &'static [TierRule],
    /// Tiers starting at or above this position are marked guaranteed
    pub guaranteed_places: u32,
}

const fn rule(start: u32, end: u32, share_ppm: u32, ranking: u32, loyalty: u32) -> TierRule {
    TierRule::new(PositionRange::span(start, end), share_ppm, ranking, loyalty)
}

// 40 / 24 / 16 / 8 / 4 each / 2 each / 1.125 each / 0.5625 each (percent)
const STANDARD_RULES: [TierRule; 8] = [
    rule(1, 1, 400_000, 75, 1000),
    rule(2, 2, 240_000, 60, 800),
    rule(3, 3, 160_000, 45, 550),
    rule(4, 4, 80_000, 35, 450),
    rule(5, 6, 40_000, 25, 400),
    rule(7, 8, 20_000, 20, 300),
    rule(9, 12, 11_250, 15, 200),
    rule(13, 16, 5_625, 10, 100),
];

const TOP_THREE_RULES: [TierRule; 8] = [
    rule(1, 1, 500_000, 75, 1000),
    rule(2, 2, 300_000, 60, 800),
    rule(3, 3, 200_000, 45, 550),
    rule(4, 4, 0, 35, 450),
    rule(5, 6, 0, 25, 400),
    rule(7, 8, 0, 20, 300),
    rule(9, 12, 0, 15, 200),
    rule(13, 16, 0, 10, 100),
];

const WINNER_TAKES_ALL_RULES: [TierRule; 8] = [
    rule(1, 1, 1_000_000, 75, 1000),
    rule(2, 2, 0, 60, 800),
    rule(3, 3, 0, 45, 550),
    rule(4, 4, 0, 35, 450),
    rule(5, 6, 0, 25, 400),
    rule(7, 8, 0, 20, 300),
    rule(9, 12, 0, 15, 200),
    rule(13, 16, 0, 10, 100),
];

static PROFILES: [PrizeProfile; 3] = [
    PrizeProfile {
        name: "standard",
        rules: &STANDARD_RULES,
        guaranteed_places: 3,
    },
    PrizeProfile {
        name: "top_three",
        rules: &TOP_THREE_RULES,
        guaranteed_places: 3,
    },
    PrizeProfile {
        name: "winner_takes_all",
        rules: &WINNER_TAKES_ALL_RULES,
        guaranteed_places: 1,
    },
];

impl PrizeProfile {
    /// Look up a profile by name
    ///
    /// # Errors
    ///
    /// * `UnknownProfile` - no profile has this name
    pub fn by_name(name: &str) -> PrizeResult<&'static PrizeProfile> {
        PROFILES
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PrizeError::UnknownProfile(name.to_string()))
    }

    /// Names of all known profiles
    pub fn names() -> impl Iterator<Item = &'static str> {
        PROFILES.iter().map(|p| p.name)
    }

    /// Last position the table covers
    pub fn covered_positions(&self) -> u32 {
        self.rules.last().map(|r| r.positions.end).unwrap_or(0)
    }
}

/// Explicit cash amounts for the top three places
///
/// Zero or negative values count as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeOverrides {
    pub first: Option<i64>,
    pub second: Option<i64>,
    pub third: Option<i64>,
}

impl PrizeOverrides {
    /// Pinned amount for a position, if any
    pub fn for_position(&self, position: u32) -> Option<i64> {
        let pinned = match position {
            1 => self.first,
            2 => self.second,
            3 => self.third,
            _ => None,
        };
        pinned.filter(|amount| *amount > 0)
    }
}

/// Reward for each position of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub positions: PositionRange,
    /// Cash for each single position in the range
    pub cash_amount: i64,
    pub ranking_points: u32,
    pub loyalty_points: u32,
    pub is_guaranteed: bool,
    pub class: TierClass,
}

/// Ordered tier list for one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSchedule {
    pub profile: String,
    pub pool_total: i64,
    pub tiers: Vec<PrizeTier>,
}

/// What one participant receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub participant: ParticipantId,
    pub position: u32,
    pub cash: i64,
    pub ranking_points: u32,
    pub loyalty_points: u32,
}

impl PrizeSchedule {
    /// Tier covering a position (1-indexed)
    pub fn tier_for_position(&self, position: u32) -> Option<&PrizeTier> {
        self.tiers.iter().find(|t| t.positions.contains(position))
    }

    /// Cash for a specific position (1-indexed)
    pub fn payout_for_position(&self, position: u32) -> Option<i64> {
        self.tier_for_position(position).map(|t| t.cash_amount)
    }

    /// Cash paid across every covered position
    pub fn total_cash(&self) -> i64 {
        self.tiers
            .iter()
            .map(|t| t.cash_amount * i64::from(t.positions.width()))
            .sum()
    }

    /// Part of the pool left unpaid by floor rounding or empty tiers
    pub fn unallocated(&self) -> i64 {
        (self.pool_total.max(0) - self.total_cash()).max(0)
    }

    /// Map final standings onto the schedule
    ///
    /// Uses each standing's unique position, so two participants sharing an
    /// elimination stage take consecutive tiers rather than both taking the
    /// better one. Positions past the table receive nothing.
    pub fn award(&self, standings: &[Standing]) -> Vec<Award> {
        standings
            .iter()
            .filter_map(|s| {
                self.tier_for_position(s.position).map(|tier| Award {
                    participant: s.participant,
                    position: s.position,
                    cash: tier.cash_amount,
                    ranking_points: tier.ranking_points,
                    loyalty_points: tier.loyalty_points,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_range_display() {
        assert_eq!(PositionRange::single(1).to_string(), "1");
        assert_eq!(PositionRange::span(9, 12).to_string(), "9-12");
        assert_eq!(PositionRange::span(9, 12).width(), 4);
        assert!(PositionRange::span(5, 6).contains(6));
        assert!(!PositionRange::span(5, 6).contains(7));
    }

    #[test]
    fn test_profiles_cover_sixteen_positions_contiguously() {
        for name in PrizeProfile::names() {
            let profile = PrizeProfile::by_name(name).unwrap();
            assert_eq!(profile.covered_positions(), 16, "profile {}", name);

            let mut next = 1;
            for rule in profile.rules {
                assert_eq!(rule.positions.start, next, "profile {} has a gap", name);
                next = rule.positions.end + 1;
            }
        }
    }

    #[test]
    fn test_standard_table_shares() {
        let profile = PrizeProfile::by_name("standard").unwrap();
        let shares: Vec<u32> = profile.rules.iter().map(|r| r.share_ppm).collect();
        assert_eq!(
            shares,
            vec![400_000, 240_000, 160_000, 80_000, 40_000, 20_000, 11_250, 5_625]
        );
    }

    #[test]
    fn test_unknown_profile() {
        assert_eq!(
            PrizeProfile::by_name("jackpot").unwrap_err(),
            PrizeError::UnknownProfile("jackpot".to_string())
        );
    }

    #[test]
    fn test_overrides_ignore_non_positive() {
        let overrides = PrizeOverrides {
            first: Some(0),
            second: Some(-5),
            third: Some(100),
        };
        assert_eq!(overrides.for_position(1), None);
        assert_eq!(overrides.for_position(2), None);
        assert_eq!(overrides.for_position(3), Some(100));
        assert_eq!(overrides.for_position(4), None);
    }

    #[test]
    fn test_tier_class() {
        assert_eq!(TierClass::for_position(1), TierClass::Podium);
        assert_eq!(TierClass::for_position(4), TierClass::Contender);
        assert_eq!(TierClass::for_position(13), TierClass::Field);
    }
}
