//! Store-backed compare and rewrite operations.

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use pacer_db::queries::{activities, plans as plan_queries, workouts as workout_queries};

use super::ReconcileError;
use super::compliance::{CompareOutcome, ComplianceReport};
use super::proposal::{ProposedWorkout, validate_proposals};

/// Counts reported back after a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub plan_id: Uuid,
    pub deleted: u64,
    pub inserted: u64,
    pub cutoff: NaiveDate,
}

/// Compare the workout scheduled for `user_id` on `date` with the runs
/// recorded that day.
///
/// Read-only. Returns [`CompareOutcome::NotScheduled`] when nothing is
/// scheduled.
pub async fn compare(
    pool: &PgPool,
    user_id: &str,
    date: NaiveDate,
) -> Result<CompareOutcome, ReconcileError> {
    if user_id.trim().is_empty() {
        return Err(ReconcileError::InvalidInput("user_id must not be empty".to_owned()));
    }

    let Some(planned) = workout_queries::find_workout_on(pool, user_id, date).await? else {
        debug!(user_id, %date, "no workout scheduled");
        return Ok(CompareOutcome::NotScheduled { date });
    };

    let totals = activities::day_run_totals(pool, user_id, date).await?;
    debug!(
        user_id,
        %date,
        runs = totals.activity_count,
        meters = totals.total_distance_m,
        "aggregated runs for day"
    );

    let report = ComplianceReport::new(
        date,
        planned.plan_id,
        planned.distance_km,
        totals.total_distance_m / 1000.0,
        totals.avg_speed_mps,
    );
    Ok(CompareOutcome::Report(report))
}

/// Replace every workout of `plan_id` dated on or after the earliest
/// proposed date with `proposals`.
///
/// Runs in one transaction. The plan row is locked first, so two rewrites of
/// the same plan never interleave; on any error the transaction is dropped
/// uncommitted and the plan is left exactly as it was.
pub async fn rewrite(
    pool: &PgPool,
    plan_id: Uuid,
    proposals: &[ProposedWorkout],
) -> Result<RewriteResult, ReconcileError> {
    let rows = validate_proposals(proposals)?;
    let cutoff = rows[0].scheduled_date;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let user_id = plan_queries::lock_plan_owner(&mut *tx, plan_id)
        .await?
        .ok_or(ReconcileError::PlanNotFound(plan_id))?;

    let deleted = workout_queries::delete_workouts_from(&mut *tx, plan_id, cutoff).await?;
    let inserted = workout_queries::insert_workouts(&mut *tx, plan_id, &user_id, &rows).await?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(%plan_id, %cutoff, deleted, inserted, "plan rewritten");
    Ok(RewriteResult {
        plan_id,
        deleted,
        inserted,
        cutoff,
    })
}
