//! Engine configuration.
//!
//! Consolidates the environment variable reads for bracket sizing and prize
//! defaults. Every value has a default so the engine works with no
//! environment at all.

use crate::bracket::BracketFormat;
use std::env;
use thiserror::Error;

/// Largest bracket the seeding and prize tables are defined for.
pub const MAX_SUPPORTED_BRACKET_SIZE: usize = 16;

/// Smallest field a single elimination bracket can be played with.
pub const SINGLE_ELIM_FLOOR: usize = 2;

/// Smallest field the SABO double elimination layout can be played with.
pub const SABO_DOUBLE_FLOOR: usize = 4;

/// Prize profile used when the caller does not name one.
pub const DEFAULT_PRIZE_PROFILE: &str = "standard";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but is out of range
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Bracket engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest participant count a bracket may be built for
    pub max_bracket_size: usize,

    /// Minimum confirmed participants for single elimination
    pub single_elim_min_participants: usize,

    /// Minimum confirmed participants for SABO double elimination
    pub sabo_double_min_participants: usize,

    /// Prize profile name used when none is given
    pub default_prize_profile: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bracket_size: MAX_SUPPORTED_BRACKET_SIZE,
            single_elim_min_participants: SINGLE_ELIM_FLOOR,
            sabo_double_min_participants: SABO_DOUBLE_FLOOR,
            default_prize_profile: DEFAULT_PRIZE_PROFILE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `SABO_MAX_BRACKET_SIZE`: largest supported field (default: 16)
    /// - `SABO_SINGLE_ELIM_MIN_PARTICIPANTS`: single elimination minimum (default: 2)
    /// - `SABO_DOUBLE_MIN_PARTICIPANTS`: SABO double elimination minimum (default: 4)
    /// - `SABO_DEFAULT_PRIZE_PROFILE`: prize profile name (default: "standard")
    ///
    /// Unparseable values fall back to the default.
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration fails [`EngineConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            max_bracket_size: parse_env_or("SABO_MAX_BRACKET_SIZE", defaults.max_bracket_size),
            single_elim_min_participants: parse_env_or(
                "SABO_SINGLE_ELIM_MIN_PARTICIPANTS",
                defaults.single_elim_min_participants,
            ),
            sabo_double_min_participants: parse_env_or(
                "SABO_DOUBLE_MIN_PARTICIPANTS",
                defaults.sabo_double_min_participants,
            ),
            default_prize_profile: env::var("SABO_DEFAULT_PRIZE_PROFILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.default_prize_profile),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if a minimum is below the format's floor or above the
    /// maximum bracket size, or if the maximum exceeds the seeding tables.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bracket_size < SINGLE_ELIM_FLOOR
            || self.max_bracket_size > MAX_SUPPORTED_BRACKET_SIZE
        {
            return Err(ConfigError::Invalid {
                var: "SABO_MAX_BRACKET_SIZE".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    SINGLE_ELIM_FLOOR, MAX_SUPPORTED_BRACKET_SIZE
                ),
            });
        }

        if self.single_elim_min_participants < SINGLE_ELIM_FLOOR
            || self.single_elim_min_participants > self.max_bracket_size
        {
            return Err(ConfigError::Invalid {
                var: "SABO_SINGLE_ELIM_MIN_PARTICIPANTS".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    SINGLE_ELIM_FLOOR, self.max_bracket_size
                ),
            });
        }

        if self.sabo_double_min_participants < SABO_DOUBLE_FLOOR
            || self.sabo_double_min_participants > self.max_bracket_size
        {
            return Err(ConfigError::Invalid {
                var: "SABO_DOUBLE_MIN_PARTICIPANTS".to_string(),
                reason: format!(
                    "Must be between {} and {}",
                    SABO_DOUBLE_FLOOR, self.max_bracket_size
                ),
            });
        }

        Ok(())
    }

    /// Minimum confirmed participants for a format
    pub fn min_participants(&self, format: BracketFormat) -> usize {
        match format {
            BracketFormat::SingleElim => self.single_elim_min_participants,
            BracketFormat::SaboDouble => self.sabo_double_min_participants,
        }
    }
}

/// Parse an environment variable or return the default value
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
