//! Database query functions for the `training_plans` table.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::TrainingPlan;

/// Insert a new plan row. Returns the inserted plan with server-generated
/// defaults (id, created_at).
pub async fn insert_plan(conn: &mut PgConnection, user_id: &str, goal: &str) -> Result<TrainingPlan> {
    let plan = sqlx::query_as::<_, TrainingPlan>(
        "INSERT INTO training_plans (user_id, goal) \
         VALUES ($1, $2) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(goal)
    .fetch_one(conn)
    .await
    .context("failed to insert plan")?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<TrainingPlan>> {
    let plan = sqlx::query_as::<_, TrainingPlan>("SELECT * FROM training_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// List plans, newest first, optionally restricted to one user.
pub async fn list_plans(pool: &PgPool, user_id: Option<&str>) -> Result<Vec<TrainingPlan>> {
    let plans = sqlx::query_as::<_, TrainingPlan>(
        "SELECT * FROM training_plans \
         WHERE ($1::text IS NULL OR user_id = $1) \
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list plans")?;

    Ok(plans)
}

/// Resolve the owning user of a plan and lock the plan row until the
/// surrounding transaction ends.
///
/// Must be called inside a transaction. Concurrent callers on the same plan
/// block here until the holder commits or rolls back.
pub async fn lock_plan_owner(conn: &mut PgConnection, id: Uuid) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT user_id FROM training_plans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context("failed to lock plan")?;

    Ok(row.map(|(user_id,)| user_id))
}

/// Delete a plan and (by cascade) all of its workouts.
pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM training_plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete plan")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("plan {id} not found");
    }

    Ok(())
}
