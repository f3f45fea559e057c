//! CLI handlers for `pacer activity` subcommands.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;

use pacer_core::ingest::{import_activities, parse_payload};
use pacer_db::queries::activities;

use crate::ActivityCommands;

pub async fn run_activity_command(command: ActivityCommands, pool: &PgPool) -> Result<()> {
    match command {
        ActivityCommands::Import { file, user } => cmd_import(pool, &file, &user).await,
        ActivityCommands::List { user, limit } => cmd_list(pool, &user, limit).await,
    }
}

/// Import a provider export (JSON array or single object).
async fn cmd_import(pool: &PgPool, file_path: &str, user: &str) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read activity file: {file_path}"))?;
    let batch = parse_payload(&content)
        .with_context(|| format!("failed to parse activity file: {file_path}"))?;

    let total = batch.len();
    let summary = import_activities(pool, user, batch).await;

    println!("Imported {} of {total} activities for {user}.", summary.upserted);
    if summary.skipped > 0 {
        println!();
        println!("Skipped {}:", summary.skipped);
        for e in &summary.errors {
            println!("  - {e}");
        }
    }

    if summary.upserted == 0 && total > 0 {
        bail!("no activities were imported");
    }
    Ok(())
}

async fn cmd_list(pool: &PgPool, user: &str, limit: i64) -> Result<()> {
    let rows = activities::list_activities(pool, user, limit).await?;

    if rows.is_empty() {
        println!("No activities found for {user}.");
        return Ok(());
    }

    println!(
        "{:<12}  {:<16}  {:<6}  {:>8}  {:>8}  NAME",
        "ID", "START", "KIND", "KM", "MIN"
    );
    for a in &rows {
        println!(
            "{:<12}  {:<16}  {:<6}  {:>8.2}  {:>8.1}  {}",
            a.provider_id,
            a.start_date_local.format("%Y-%m-%d %H:%M"),
            a.kind,
            a.distance_m / 1000.0,
            f64::from(a.moving_time_s) / 60.0,
            a.name,
        );
    }

    Ok(())
}
