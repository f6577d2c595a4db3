//! Pool distribution.

use super::{
    errors::PrizeResult,
    models::{PPM, PrizeOverrides, PrizeProfile, PrizeSchedule, PrizeTier, TierClass},
};

/// Split a prize pool across a profile's positions
///
/// Tiers are filled best position first. Each position gets its share of the
/// pool floored to a whole unit (or the override for places 1-3), capped by
/// what is still unallocated, so the total never exceeds `pool_total`. A
/// pool of zero or less pays no cash; ranking and loyalty points do not
/// depend on the pool.
///
/// # Arguments
///
/// * `pool_total` - Total prize pool
/// * `profile` - Profile name, e.g. `"standard"`
/// * `overrides` - Optional pinned cash for places 1-3
///
/// # Errors
///
/// * `UnknownProfile` - no profile with that name
pub fn distribute(
    pool_total: i64,
    profile: &str,
    overrides: Option<PrizeOverrides>,
) -> PrizeResult<PrizeSchedule> {
    let profile = PrizeProfile::by_name(profile)?;
    let overrides = overrides.unwrap_or_default();
    let pool = pool_total.max(0);
    let mut remaining = pool;

    let tiers = profile
        .rules
        .iter()
        .map(|rule| {
            let width = i64::from(rule.positions.width());
            let wanted = if rule.positions.width() == 1 {
                overrides.for_position(rule.positions.start)
            } else {
                None
            }
            .unwrap_or_else(|| share_of(pool, rule.share_ppm));

            let cash_amount = wanted.min(remaining / width);
            remaining -= cash_amount * width;

            PrizeTier {
                positions: rule.positions,
                cash_amount,
                ranking_points: rule.ranking_points,
                loyalty_points: rule.loyalty_points,
                is_guaranteed: rule.positions.start <= profile.guaranteed_places,
                class: TierClass::for_position(rule.positions.start),
            }
        })
        .collect();

    let schedule = PrizeSchedule {
        profile: profile.name.to_string(),
        pool_total,
        tiers,
    };

    log::debug!(
        "Distributed pool {} with profile {}: paid {}, unallocated {}",
        pool_total,
        profile.name,
        schedule.total_cash(),
        schedule.unallocated()
    );

    Ok(schedule)
}

/// Floor of `pool * ppm / 1_000_000` without overflow
fn share_of(pool: i64, share_ppm: u32) -> i64 {
    (i128::from(pool) * i128::from(share_ppm) / i128::from(PPM)) as i64
}
