mod activity_cmds;
mod coach_cmds;
mod config;
mod plan_cmds;
mod serve_cmd;
mod tool_cmds;

use clap::{Parser, Subcommand};

use pacer_core::config::StatsDefaults;
use pacer_core::tools::ToolRegistry;
use pacer_db::pool;

use config::PacerConfig;

#[derive(Parser)]
#[command(name = "pacer", about = "Training plan store and coaching tools for running agents")]
struct Cli {
    /// Database URL (overrides PACER_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a pacer config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/pacer")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the pacer database
    DbInit,
    /// Training plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Recorded activity management
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Compare a day's planned workout with the runs recorded that day
    Compare {
        /// Runner ID
        user_id: String,
        /// Day to compare (YYYY-MM-DD)
        date: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a plan's workouts from the earliest date in a JSON file onwards
    Rewrite {
        /// Plan ID to rewrite
        plan_id: String,
        /// JSON file holding a list of workouts
        file: String,
    },
    /// Show recent training stats for a runner
    Stats {
        /// Runner ID
        user_id: String,
        /// End of the 28-day window, exclusive (default: today)
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Agent tools
    Tool {
        #[command(subcommand)]
        command: ToolCommands,
    },
    /// Serve the plan API and tool endpoints over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan from a JSON plan document
    Create {
        /// Path to the plan JSON file
        file: String,
    },
    /// Show plan details (or list plans)
    Show {
        /// Plan ID to show (omit to list)
        plan_id: Option<String>,
        /// Only list plans for this runner
        #[arg(long)]
        user: Option<String>,
    },
    /// Delete a plan and all of its workouts
    Delete {
        /// Plan ID to delete
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// Import activities from a provider JSON export
    Import {
        /// Path to the JSON file (array of activities or a single activity)
        file: String,
        /// Runner the activities belong to
        #[arg(long)]
        user: String,
    },
    /// List a runner's most recent activities
    List {
        /// Runner ID
        #[arg(long)]
        user: String,
        /// Maximum number of activities to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum ToolCommands {
    /// List available tools and their parameters
    List,
    /// Call a tool with a JSON object of arguments
    Call {
        /// Tool name
        name: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
}

/// Execute the `pacer init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection::new(db_url),
        defaults: StatsDefaults::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  defaults.runner_age = {}", cfg.defaults.runner_age);
    println!(
        "  defaults.fallback_pace_min_per_km = {}",
        cfg.defaults.fallback_pace_min_per_km
    );
    println!("  defaults.injury_status = {}", cfg.defaults.injury_status);
    println!();
    println!("Next: run `pacer db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `pacer db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = PacerConfig::resolve(cli_db_url)?;

    println!("Initializing pacer database...");

    pool::ensure_database_exists(&resolved.db_config).await?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;

    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("pacer db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Init { db_url, force } => return cmd_init(&db_url, force),
        Commands::DbInit => return cmd_db_init(cli.database_url.as_deref()).await,
        other => other,
    };

    let resolved = PacerConfig::resolve(cli.database_url.as_deref())?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    let result = match command {
        Commands::Plan { command } => plan_cmds::run_plan_command(command, &db_pool).await,
        Commands::Activity { command } => {
            activity_cmds::run_activity_command(command, &db_pool).await
        }
        Commands::Compare {
            user_id,
            date,
            json,
        } => coach_cmds::run_compare(&db_pool, &user_id, &date, json).await,
        Commands::Rewrite { plan_id, file } => {
            coach_cmds::run_rewrite(&db_pool, &plan_id, &file).await
        }
        Commands::Stats { user_id, as_of } => {
            coach_cmds::run_stats(&db_pool, &resolved.engine, &user_id, as_of.as_deref()).await
        }
        Commands::Tool { command } => {
            let registry = ToolRegistry::new(db_pool.clone(), resolved.engine.clone());
            tool_cmds::run_tool_command(command, &registry).await
        }
        Commands::Serve { bind, port } => {
            serve_cmd::run_serve(db_pool.clone(), resolved.engine.clone(), &bind, port).await
        }
        Commands::Init { .. } | Commands::DbInit => Ok(()),
    };

    db_pool.close().await;
    result
}
