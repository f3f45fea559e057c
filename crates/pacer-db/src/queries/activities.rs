//! Database query functions for the `activities` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::models::{Activity, ActivityKind, NewActivity};

/// Aggregated run activity for a single local day.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DayTotals {
    pub total_distance_m: f64,
    pub avg_speed_mps: Option<f64>,
    pub activity_count: i64,
}

/// Aggregated run activity over a date window.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct WindowTotals {
    pub total_distance_m: f64,
    pub run_count: i64,
    /// Best average moving speed among runs at least the requested length.
    pub best_speed_mps: Option<f64>,
}

/// Insert an activity, or refresh every column when the provider id is
/// already known. Re-syncing the same history is therefore harmless.
pub async fn upsert_activity(pool: &PgPool, activity: &NewActivity) -> Result<()> {
    sqlx::query(
        "INSERT INTO activities ( \
             provider_id, user_id, name, kind, provider_type, start_date_local, \
             distance_m, moving_time_s, elapsed_time_s, elevation_gain_m, \
             average_speed_mps, max_speed_mps, average_heartrate, max_heartrate, calories \
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         ON CONFLICT (provider_id) DO UPDATE SET \
             user_id = EXCLUDED.user_id, \
             name = EXCLUDED.name, \
             kind = EXCLUDED.kind, \
             provider_type = EXCLUDED.provider_type, \
             start_date_local = EXCLUDED.start_date_local, \
             distance_m = EXCLUDED.distance_m, \
             moving_time_s = EXCLUDED.moving_time_s, \
             elapsed_time_s = EXCLUDED.elapsed_time_s, \
             elevation_gain_m = EXCLUDED.elevation_gain_m, \
             average_speed_mps = EXCLUDED.average_speed_mps, \
             max_speed_mps = EXCLUDED.max_speed_mps, \
             average_heartrate = EXCLUDED.average_heartrate, \
             max_heartrate = EXCLUDED.max_heartrate, \
             calories = EXCLUDED.calories, \
             ingested_at = now()",
    )
    .bind(activity.provider_id)
    .bind(&activity.user_id)
    .bind(&activity.name)
    .bind(activity.kind)
    .bind(&activity.provider_type)
    .bind(activity.start_date_local)
    .bind(activity.distance_m)
    .bind(activity.moving_time_s)
    .bind(activity.elapsed_time_s)
    .bind(activity.elevation_gain_m)
    .bind(activity.average_speed_mps)
    .bind(activity.max_speed_mps)
    .bind(activity.average_heartrate)
    .bind(activity.max_heartrate)
    .bind(activity.calories)
    .execute(pool)
    .await
    .with_context(|| format!("failed to upsert activity {}", activity.provider_id))?;

    Ok(())
}

/// Fetch an activity by provider id.
pub async fn get_activity(pool: &PgPool, provider_id: i64) -> Result<Option<Activity>> {
    let activity = sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE provider_id = $1")
        .bind(provider_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch activity")?;

    Ok(activity)
}

/// List a user's activities, most recent first.
pub async fn list_activities(pool: &PgPool, user_id: &str, limit: i64) -> Result<Vec<Activity>> {
    let activities = sqlx::query_as::<_, Activity>(
        "SELECT * FROM activities \
         WHERE user_id = $1 \
         ORDER BY start_date_local DESC \
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to list activities")?;

    Ok(activities)
}

/// Sum distance and average speed across a user's runs on one local day.
pub async fn day_run_totals(pool: &PgPool, user_id: &str, date: NaiveDate) -> Result<DayTotals> {
    let totals = sqlx::query_as::<_, DayTotals>(
        "SELECT COALESCE(SUM(distance_m), 0)::float8 AS total_distance_m, \
                AVG(average_speed_mps)::float8 AS avg_speed_mps, \
                COUNT(*) AS activity_count \
         FROM activities \
         WHERE user_id = $1 AND kind = $2 AND start_date_local::date = $3",
    )
    .bind(user_id)
    .bind(ActivityKind::Run)
    .bind(date)
    .fetch_one(pool)
    .await
    .context("failed to aggregate activities for day")?;

    Ok(totals)
}

/// Aggregate a user's runs with `from <= local date < until`.
///
/// `best_speed_mps` only considers runs of at least `min_distance_m` with a
/// non-zero moving time.
pub async fn window_run_totals(
    pool: &PgPool,
    user_id: &str,
    from: NaiveDate,
    until: NaiveDate,
    min_distance_m: f64,
) -> Result<WindowTotals> {
    let totals = sqlx::query_as::<_, WindowTotals>(
        "SELECT COALESCE(SUM(distance_m), 0)::float8 AS total_distance_m, \
                COUNT(*) AS run_count, \
                MAX(distance_m / moving_time_s) \
                    FILTER (WHERE distance_m >= $5 AND moving_time_s > 0) AS best_speed_mps \
         FROM activities \
         WHERE user_id = $1 AND kind = $2 \
           AND start_date_local::date >= $3 AND start_date_local::date < $4",
    )
    .bind(user_id)
    .bind(ActivityKind::Run)
    .bind(from)
    .bind(until)
    .bind(min_distance_m)
    .fetch_one(pool)
    .await
    .context("failed to aggregate activities for window")?;

    Ok(totals)
}
