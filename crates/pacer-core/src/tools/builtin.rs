//! The tools exposed to the planning and coaching agents.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::planner::{self, RunnerStats};
use crate::reconcile::{self, CompareOutcome, ProposedWorkout};

use super::args;
use super::{Tool, ToolContext, ToolError, ToolParam, ToolSpec};

/// Message returned when nothing is scheduled on the compared date.
pub const NOT_SCHEDULED_MESSAGE: &str = "No workout was scheduled for this date.";

/// Message returned when a rewrite is sent an empty list.
pub const NO_WORKOUTS_MESSAGE: &str = "No workouts provided.";

/// Compare the planned workout against the runs recorded on one day.
pub struct ComparePlanVsActual;

#[async_trait]
impl Tool for ComparePlanVsActual {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "compare_plan_vs_actual",
            description: "Compares the planned workout with the runs actually recorded on a \
                          date (YYYY-MM-DD). Returns planned_km, actual_km, compliance_percent \
                          and a verdict (Missed below 50%, otherwise Good).",
            params: vec![
                ToolParam::required("user_id", "Runner whose plan is checked."),
                ToolParam::required("date", "Day to compare, YYYY-MM-DD."),
            ],
        }
    }

    fn error_prefix(&self) -> &'static str {
        "Error comparing data"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError> {
        let user_id = args::required_str(args, "user_id")?;
        let date = args::required_date(args, "date")?;

        match reconcile::compare(&ctx.pool, user_id, date).await? {
            CompareOutcome::NotScheduled { .. } => Ok(NOT_SCHEDULED_MESSAGE.to_owned()),
            CompareOutcome::Report(report) => Ok(serde_json::to_string(&report)?),
        }
    }
}

/// Replace the future tail of a plan.
pub struct UpdateTrainingPlan;

#[async_trait]
impl Tool for UpdateTrainingPlan {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "update_training_plan",
            description: "Updates the future workouts of an existing plan. Every workout of \
                          the plan dated on or after the earliest date in the new list is \
                          deleted and replaced by the new list. Earlier workouts are kept.",
            params: vec![
                ToolParam::required("plan_id", "Plan to update."),
                ToolParam::required(
                    "new_workouts_json",
                    "JSON list of workouts: {date, type, distance_km, pace, description}.",
                ),
            ],
        }
    }

    fn error_prefix(&self) -> &'static str {
        "Update failed"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError> {
        let plan_id = args::required_uuid(args, "plan_id")?;
        let raw = args::required_json(args, "new_workouts_json")?;
        let proposals: Vec<ProposedWorkout> = serde_json::from_value(raw)
            .map_err(|e| ToolError::invalid("new_workouts_json", format!("malformed workout list: {e}")))?;

        if proposals.is_empty() {
            return Err(ToolError::Rejected(NO_WORKOUTS_MESSAGE));
        }

        let result = reconcile::rewrite(&ctx.pool, plan_id, &proposals).await?;
        Ok(format!(
            "Updated plan {}: deleted {} old workouts, added {} new ones starting from {}.",
            result.plan_id, result.deleted, result.inserted, result.cutoff
        ))
    }
}

/// Store a freshly generated plan.
pub struct SaveTrainingPlan;

#[async_trait]
impl Tool for SaveTrainingPlan {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "save_training_plan",
            description: "Saves a generated training plan. 'plan_data' is a JSON object \
                          {user_id, goal_description, workouts: [...]}.",
            params: vec![ToolParam::required("plan_data", "The plan document as JSON.")],
        }
    }

    fn error_prefix(&self) -> &'static str {
        "Error saving plan"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError> {
        let raw = args::required_json(args, "plan_data")?;
        let doc = planner::parse_plan_doc(&raw.to_string())?;
        let saved = planner::create_plan(&ctx.pool, &doc).await?;
        Ok(format!(
            "Success: plan {} saved with {} workouts.",
            saved.plan.id,
            saved.workouts.len()
        ))
    }
}

/// Recent training summary used before planning.
pub struct GetRunnerStats;

#[async_trait]
impl Tool for GetRunnerStats {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_runner_stats",
            description: "Fetches the runner's recent performance: average weekly km over \
                          the last 28 days, estimated pace and 5k time. Use this before \
                          creating a plan.",
            params: vec![
                ToolParam::required("user_id", "Runner to summarize."),
                ToolParam::optional("as_of", "Day the window ends on (exclusive), YYYY-MM-DD. Defaults to today."),
            ],
        }
    }

    fn error_prefix(&self) -> &'static str {
        "Error fetching stats"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError> {
        let user_id = args::required_str(args, "user_id")?;
        let as_of = args::optional_date(args, "as_of")?
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let stats: RunnerStats =
            planner::runner_stats(&ctx.pool, user_id, as_of, &ctx.config.stats).await?;
        debug!(user_id, fallback = stats.used_fallback_pace, "runner stats computed");
        Ok(serde_json::to_string(&stats)?)
    }
}

/// A plan and its workouts in date order.
pub struct ListPlanWorkouts;

#[async_trait]
impl Tool for ListPlanWorkouts {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "list_plan_workouts",
            description: "Lists every workout of a plan in date order.",
            params: vec![ToolParam::required("plan_id", "Plan to list.")],
        }
    }

    fn error_prefix(&self) -> &'static str {
        "Error listing workouts"
    }

    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError> {
        let plan_id = args::required_uuid(args, "plan_id")?;
        let plan = planner::get_plan_with_workouts(&ctx.pool, plan_id).await?;
        Ok(serde_json::to_string(&plan)?)
    }
}
