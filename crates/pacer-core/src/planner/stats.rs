//! Runner statistics derived from recorded runs.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

use pacer_db::queries::activities;

use crate::config::StatsDefaults;
use crate::reconcile::ReconcileError;
use crate::reconcile::compliance::round_to;

/// Length of the look-back window, in days.
pub const STATS_WINDOW_DAYS: u64 = 28;

/// Shortest run that counts towards the pace estimate.
pub const MIN_PACE_RUN_M: f64 = 3000.0;

/// Snapshot of a runner's recent training, as handed to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerStats {
    pub user_id: String,
    pub as_of: NaiveDate,
    pub age: u32,
    pub avg_weekly_km: f64,
    pub runs_in_window: i64,
    pub estimated_pace_min_per_km: f64,
    pub recent_5k_time_min: f64,
    pub injury_status: String,
    /// Age came from [`StatsDefaults::runner_age`], not from data.
    pub used_default_age: bool,
    /// Injury status came from [`StatsDefaults::injury_status`].
    pub used_default_injury_status: bool,
    /// No qualifying run in the window; pace is the configured fallback.
    pub used_fallback_pace: bool,
}

/// Minutes per kilometre for a speed in metres per second.
pub fn pace_from_speed(speed_mps: f64) -> Option<f64> {
    (speed_mps.is_finite() && speed_mps > 0.0).then(|| 1000.0 / speed_mps / 60.0)
}

/// Compute stats over the [`STATS_WINDOW_DAYS`] days before `as_of`
/// (`as_of` itself excluded).
pub async fn runner_stats(
    pool: &PgPool,
    user_id: &str,
    as_of: NaiveDate,
    defaults: &StatsDefaults,
) -> Result<RunnerStats, ReconcileError> {
    if user_id.trim().is_empty() {
        return Err(ReconcileError::InvalidInput("user_id must not be empty".to_owned()));
    }

    let from = as_of
        .checked_sub_days(Days::new(STATS_WINDOW_DAYS))
        .ok_or_else(|| ReconcileError::InvalidInput(format!("date {as_of} is out of range")))?;

    let totals = activities::window_run_totals(pool, user_id, from, as_of, MIN_PACE_RUN_M).await?;
    debug!(user_id, %from, %as_of, runs = totals.run_count, "runner stats window");

    let weeks = STATS_WINDOW_DAYS as f64 / 7.0;
    let avg_weekly_km = round_to(totals.total_distance_m / 1000.0 / weeks, 1);

    let measured_pace = totals.best_speed_mps.and_then(pace_from_speed);
    let used_fallback_pace = measured_pace.is_none();
    let pace = measured_pace.unwrap_or(defaults.fallback_pace_min_per_km);

    Ok(RunnerStats {
        user_id: user_id.to_owned(),
        as_of,
        age: defaults.runner_age,
        avg_weekly_km,
        runs_in_window: totals.run_count,
        estimated_pace_min_per_km: round_to(pace, 2),
        recent_5k_time_min: round_to(pace * 5.0, 1),
        injury_status: defaults.injury_status.clone(),
        used_default_age: true,
        used_default_injury_status: true,
        used_fallback_pace,
    })
}
