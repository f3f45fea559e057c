//! CLI handlers for `pacer plan` subcommands.
//!
//! Implements:
//! - `pacer plan create <file>`   -- create a plan from a JSON plan document
//! - `pacer plan show [plan-id]`  -- show one plan or list plans
//! - `pacer plan delete <plan-id>` -- delete a plan and its workouts

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use pacer_core::planner::{create_plan, get_plan_with_workouts, parse_plan_doc};
use pacer_db::queries::plans as plan_queries;

use crate::PlanCommands;

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &PgPool) -> Result<()> {
    match command {
        PlanCommands::Create { file } => cmd_create(pool, &file).await,
        PlanCommands::Show { plan_id, user } => match plan_id {
            Some(id) => cmd_show_one(pool, &id).await,
            None => cmd_show_all(pool, user.as_deref()).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(pool, &plan_id).await,
    }
}

pub fn parse_plan_id(raw: &str) -> Result<Uuid> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid plan ID: {raw:?}"))
}

// -----------------------------------------------------------------------
// pacer plan create <file>
// -----------------------------------------------------------------------

async fn cmd_create(pool: &PgPool, file_path: &str) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read plan file: {file_path}"))?;

    let doc = parse_plan_doc(&content)
        .with_context(|| format!("failed to parse plan file: {file_path}"))?;

    let saved = create_plan(pool, &doc).await?;

    println!("Plan created successfully.");
    println!();
    println!("  Plan ID:   {}", saved.plan.id);
    println!("  User:      {}", saved.plan.user_id);
    println!("  Goal:      {}", saved.plan.goal);
    println!("  Workouts:  {}", saved.workouts.len());
    if let (Some(first), Some(last)) = (saved.workouts.first(), saved.workouts.last()) {
        println!(
            "  Span:      {} .. {}",
            first.scheduled_date, last.scheduled_date
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// pacer plan show (list)
// -----------------------------------------------------------------------

async fn cmd_show_all(pool: &PgPool, user: Option<&str>) -> Result<()> {
    let plans = plan_queries::list_plans(pool, user).await?;

    if plans.is_empty() {
        println!("No plans found. Use `pacer plan create <file>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let user_w = plans.iter().map(|p| p.user_id.len()).max().unwrap_or(4).max(4);
    let count_w = 8;

    println!(
        "{:<id_w$}  {:<user_w$}  {:>count_w$}  {:<16}  GOAL",
        "ID", "USER", "WORKOUTS", "CREATED",
    );

    for plan in &plans {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE plan_id = $1")
            .bind(plan.id)
            .fetch_one(pool)
            .await
            .context("failed to count workouts")?;
        let created = plan.created_at.format("%Y-%m-%d %H:%M");
        println!(
            "{:<id_w$}  {:<user_w$}  {:>count_w$}  {:<16}  {}",
            plan.id, plan.user_id, row.0, created, plan.goal,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// pacer plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show_one(pool: &PgPool, plan_id_str: &str) -> Result<()> {
    let plan_id = parse_plan_id(plan_id_str)?;
    let detail = get_plan_with_workouts(pool, plan_id).await?;
    let plan = &detail.plan;

    println!("Plan: {}", plan.id);
    println!("  User:      {}", plan.user_id);
    println!("  Goal:      {}", plan.goal);
    println!(
        "  Created:   {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Workouts:  {}", detail.workouts.len());

    if detail.workouts.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "  {:<10}  {:<16}  {:>8}  {:<8}  DESCRIPTION",
        "DATE", "TYPE", "KM", "PACE"
    );
    for w in &detail.workouts {
        println!(
            "  {:<10}  {:<16}  {:>8.1}  {:<8}  {}",
            w.scheduled_date,
            w.workout_type,
            w.distance_km,
            w.target_pace.as_deref().unwrap_or("-"),
            w.description.as_deref().unwrap_or(""),
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// pacer plan delete <plan-id>
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &PgPool, plan_id_str: &str) -> Result<()> {
    let plan_id = parse_plan_id(plan_id_str)?;
    plan_queries::delete_plan(pool, plan_id).await?;
    println!("Plan {plan_id} deleted.");
    Ok(())
}
