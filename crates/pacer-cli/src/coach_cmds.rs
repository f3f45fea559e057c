//! `pacer compare`, `pacer rewrite` and `pacer stats`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;

use pacer_core::config::EngineConfig;
use pacer_core::planner::runner_stats;
use pacer_core::reconcile::{self, CompareOutcome, parse_proposals};
use pacer_core::tools::NOT_SCHEDULED_MESSAGE;

use crate::plan_cmds::parse_plan_id;

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?} (expected YYYY-MM-DD)"))
}

pub async fn run_compare(pool: &PgPool, user: &str, date: &str, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let outcome = reconcile::compare(pool, user, date).await?;

    let report = match outcome {
        CompareOutcome::NotScheduled { .. } => {
            println!("{NOT_SCHEDULED_MESSAGE}");
            return Ok(());
        }
        CompareOutcome::Report(report) => report,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Compliance for {user} on {}", report.date);
    println!("  Plan:        {}", report.plan_id);
    println!("  Planned:     {:.2} km", report.planned_km);
    println!("  Actual:      {:.2} km", report.actual_km);
    println!("  Compliance:  {:.1}%", report.compliance_percent);
    println!("  Verdict:     {}", report.verdict);
    Ok(())
}

/// Replace a plan's workouts from the earliest date in `file` onwards.
pub async fn run_rewrite(pool: &PgPool, plan_id: &str, file_path: &str) -> Result<()> {
    let plan_id = parse_plan_id(plan_id)?;
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read workout file: {file_path}"))?;
    let proposals = parse_proposals(&content)?;

    let result = reconcile::rewrite(pool, plan_id, &proposals).await?;
    println!(
        "Updated plan {}: deleted {} old workouts, added {} new ones starting from {}.",
        result.plan_id, result.deleted, result.inserted, result.cutoff
    );
    Ok(())
}

pub async fn run_stats(
    pool: &PgPool,
    engine: &EngineConfig,
    user: &str,
    as_of: Option<&str>,
) -> Result<()> {
    let as_of = match as_of {
        Some(raw) => parse_date(raw)?,
        None => chrono::Local::now().date_naive(),
    };
    let stats = runner_stats(pool, user, as_of, &engine.stats).await?;

    let default_mark = |used: bool| if used { " (default)" } else { "" };

    println!("Runner stats for {} (28 days before {})", stats.user_id, stats.as_of);
    println!("  Age:             {}{}", stats.age, default_mark(stats.used_default_age));
    println!(
        "  Injury status:   {}{}",
        stats.injury_status,
        default_mark(stats.used_default_injury_status)
    );
    println!("  Runs:            {}", stats.runs_in_window);
    println!("  Weekly average:  {:.1} km", stats.avg_weekly_km);
    println!(
        "  Pace:            {:.2} min/km{}",
        stats.estimated_pace_min_per_km,
        default_mark(stats.used_fallback_pace)
    );
    println!("  5k estimate:     {:.1} min", stats.recent_5k_time_min);
    Ok(())
}
