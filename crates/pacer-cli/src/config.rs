//! Configuration file management for pacer.
//!
//! Provides a TOML-based config file at `~/.config/pacer/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pacer_core::config::{EngineConfig, StatsDefaults};
use pacer_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub defaults: StatsDefaults,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_timeout_secs: Option<u64>,
}

impl DatabaseSection {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            acquire_timeout_secs: None,
            statement_timeout_secs: None,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the pacer config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/pacer` or `~/.config/pacer`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("pacer");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pacer")
}

/// Return the path to the pacer config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix; the URL may carry a password.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PacerConfig {
    pub db_config: DbConfig,
    pub engine: EngineConfig,
}

impl PacerConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `PACER_DATABASE_URL` env > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Timeouts: `database.*_timeout_secs` > `DbConfig` defaults
    /// - Stats defaults: `[defaults]` > built-in defaults
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) if config_path().exists() => return Err(e),
            Err(_) => None,
        };
        Ok(Self::from_parts(cli_db_url, std::env::var("PACER_DATABASE_URL").ok(), file_config))
    }

    fn from_parts(
        cli_db_url: Option<&str>,
        env_db_url: Option<String>,
        file_config: Option<ConfigFile>,
    ) -> Self {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Some(url) = env_db_url {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let mut db_config = DbConfig::new(db_url);
        let mut engine = EngineConfig::default();

        if let Some(cfg) = file_config {
            if let Some(secs) = cfg.database.acquire_timeout_secs {
                db_config = db_config.with_acquire_timeout(Duration::from_secs(secs));
            }
            if let Some(secs) = cfg.database.statement_timeout_secs {
                db_config = db_config.with_statement_timeout(Some(Duration::from_secs(secs)));
            }
            engine.stats = cfg.defaults;
        }

        Self { db_config, engine }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
