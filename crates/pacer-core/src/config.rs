//! Engine configuration.
//!
//! Everything the engine needs is passed in through [`EngineConfig`]; nothing
//! in this crate reads the environment.

use serde::{Deserialize, Serialize};

/// Values substituted when the store has no data for a runner.
///
/// Runner stats report which of these were used, so a caller can tell a
/// measured value from a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsDefaults {
    /// Age reported for every runner (no profile store exists yet).
    pub runner_age: u32,
    /// Pace assumed when no qualifying run exists in the stats window.
    pub fallback_pace_min_per_km: f64,
    /// Injury status reported for every runner.
    pub injury_status: String,
}

impl StatsDefaults {
    pub const DEFAULT_RUNNER_AGE: u32 = 30;
    pub const DEFAULT_FALLBACK_PACE: f64 = 5.3;
    pub const DEFAULT_INJURY_STATUS: &'static str = "None";
}

impl Default for StatsDefaults {
    fn default() -> Self {
        Self {
            runner_age: Self::DEFAULT_RUNNER_AGE,
            fallback_pace_min_per_km: Self::DEFAULT_FALLBACK_PACE,
            injury_status: Self::DEFAULT_INJURY_STATUS.to_owned(),
        }
    }
}

/// Configuration handed to the tool registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub stats: StatsDefaults,
}
