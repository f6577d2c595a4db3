//! Prize module turning a pool and a final standing into payouts.
//!
//! This module provides:
//! - Named prize profiles (percentage of pool plus fixed ranking/loyalty points per position)
//! - Pool distribution with floor rounding that never pays out more than the pool
//! - Optional cash overrides for the top three places
//! - Mapping of final standings onto the tier table
//!
//! ## Example
//!
//! ```
//! use sabo_bracket::prize::distribute;
//!
//! let schedule = distribute(1_000_000, "standard", None)?;
//! assert_eq!(schedule.payout_for_position(1), Some(400_000));
//! assert!(schedule.total_cash() <= 1_000_000);
//! # Ok::<(), sabo_bracket::prize::PrizeError>(())
//! ```

pub mod distributor;
pub mod errors;
pub mod models;

pub use distributor::distribute;
pub use errors::{PrizeError, PrizeResult};
pub use models::{
    Award, PositionRange, PrizeOverrides, PrizeProfile, PrizeSchedule, PrizeTier, TierClass,
    TierRule,
};
