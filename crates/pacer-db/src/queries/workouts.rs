//! Database query functions for the `workouts` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{NewWorkout, Workout};

/// Insert workouts for a plan, stamping each row with `plan_id` and
/// `user_id`. Returns the number of rows inserted.
///
/// Rows are inserted one statement at a time so a failure names the
/// offending date; callers wanting all-or-nothing pass a transaction.
pub async fn insert_workouts(
    conn: &mut PgConnection,
    plan_id: Uuid,
    user_id: &str,
    workouts: &[NewWorkout],
) -> Result<u64> {
    let mut inserted = 0;
    for workout in workouts {
        sqlx::query(
            "INSERT INTO workouts \
             (plan_id, user_id, scheduled_date, workout_type, distance_km, target_pace, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(plan_id)
        .bind(user_id)
        .bind(workout.scheduled_date)
        .bind(&workout.workout_type)
        .bind(workout.distance_km)
        .bind(&workout.target_pace)
        .bind(&workout.description)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to insert workout for {}", workout.scheduled_date))?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Delete every workout of `plan_id` scheduled on or after `cutoff`.
/// Returns the number of rows deleted.
pub async fn delete_workouts_from(
    conn: &mut PgConnection,
    plan_id: Uuid,
    cutoff: NaiveDate,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM workouts WHERE plan_id = $1 AND scheduled_date >= $2")
        .bind(plan_id)
        .bind(cutoff)
        .execute(conn)
        .await
        .context("failed to delete workouts")?;

    Ok(result.rows_affected())
}

/// List all workouts in a plan ordered by date.
pub async fn list_workouts_for_plan(pool: &PgPool, plan_id: Uuid) -> Result<Vec<Workout>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE plan_id = $1 ORDER BY scheduled_date, id",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list workouts for plan")?;

    Ok(workouts)
}

/// Find the workout scheduled for a user on a date.
///
/// Several plans may schedule the same day; the oldest row wins so the
/// answer is stable across calls.
pub async fn find_workout_on(
    pool: &PgPool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<Workout>> {
    let workout = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts \
         WHERE user_id = $1 AND scheduled_date = $2 \
         ORDER BY id \
         LIMIT 1",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
    .context("failed to fetch scheduled workout")?;

    Ok(workout)
}
