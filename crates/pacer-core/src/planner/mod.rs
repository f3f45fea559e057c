//! Plan creation and runner statistics for the planning agent.

pub mod stats;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use pacer_db::models::{TrainingPlan, Workout};
use pacer_db::queries::{plans as plan_queries, workouts as workout_queries};

use crate::reconcile::{ProposedWorkout, ReconcileError, validate_proposals};

pub use stats::{RunnerStats, runner_stats};

/// A complete training plan as produced by the planning agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlanDoc {
    pub user_id: String,
    #[serde(default, alias = "goal_description")]
    pub goal: String,
    pub workouts: Vec<ProposedWorkout>,
}

/// Parse a plan document from JSON.
pub fn parse_plan_doc(json: &str) -> Result<TrainingPlanDoc, ReconcileError> {
    let doc: TrainingPlanDoc = serde_json::from_str(json)
        .map_err(|e| ReconcileError::InvalidInput(format!("malformed plan document: {e}")))?;
    if doc.user_id.trim().is_empty() {
        return Err(ReconcileError::InvalidInput("user_id must not be empty".to_owned()));
    }
    Ok(doc)
}

/// A plan together with its workouts in date order.
#[derive(Debug, Clone, Serialize)]
pub struct PlanWithWorkouts {
    #[serde(flatten)]
    pub plan: TrainingPlan,
    pub workouts: Vec<Workout>,
}

/// Insert a plan and all of its workouts in a single transaction.
///
/// Workouts are validated with the same rules as a rewrite; an invalid
/// workout rejects the whole document before anything is written.
pub async fn create_plan(
    pool: &PgPool,
    doc: &TrainingPlanDoc,
) -> Result<PlanWithWorkouts, ReconcileError> {
    let rows = validate_proposals(&doc.workouts)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let plan = plan_queries::insert_plan(&mut *tx, &doc.user_id, &doc.goal).await?;
    workout_queries::insert_workouts(&mut *tx, plan.id, &doc.user_id, &rows).await?;
    tx.commit().await.context("failed to commit transaction")?;

    info!(plan_id = %plan.id, user_id = %doc.user_id, workouts = rows.len(), "plan created");

    let workouts = workout_queries::list_workouts_for_plan(pool, plan.id).await?;
    Ok(PlanWithWorkouts { plan, workouts })
}

/// Fetch a plan and its workouts.
pub async fn get_plan_with_workouts(
    pool: &PgPool,
    plan_id: Uuid,
) -> Result<PlanWithWorkouts, ReconcileError> {
    let plan = plan_queries::get_plan(pool, plan_id)
        .await?
        .ok_or(ReconcileError::PlanNotFound(plan_id))?;
    let workouts = workout_queries::list_workouts_for_plan(pool, plan_id).await?;
    Ok(PlanWithWorkouts { plan, workouts })
}
