//! CLI command handlers.

pub mod cleanup;
pub mod start;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::{info, warn};

use recipebook_config::{DEFAULT_SESSION_SECS, RecipebookConfig, SessionSection};
use recipebook_session::SessionConfig;
use recipebook_store::Database;

/// Shared context for all commands.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Storage and session overrides shared by commands that touch sessions.
///
/// Lifetimes are taken as text so an unparsable value falls back to the
/// configured one with a warning instead of aborting.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Database file (overrides config)
    #[arg(long, env = "RECIPEBOOK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Session cookie name (overrides config)
    #[arg(long, env = "COOKIE_SID")]
    pub cookie_name: Option<String>,

    /// Session lifetime in seconds (overrides config)
    #[arg(long, env = "COOKIE_MAX_AGE")]
    pub max_age: Option<String>,

    /// Seconds between expired-session cleanup passes (overrides config)
    #[arg(long, env = "CLEANUP_SESSIONS")]
    pub cleanup_interval: Option<String>,
}

/// Load configuration from `--config` or layered discovery.
pub fn load_config(ctx: &Context) -> Result<RecipebookConfig> {
    if let Some(path) = &ctx.config_path {
        let config = recipebook_config::load_config_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        info!(path = %path.display(), "Loaded config");
        return Ok(config);
    }

    let loaded = recipebook_config::load_config(None)?;
    for warning in &loaded.warnings {
        warn!("{warning}");
    }

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        info!("No config files found, using defaults and CLI args");
    } else {
        for source in sources {
            info!(path = %source.display(), "Loaded config");
        }
    }

    Ok(loaded.config)
}

/// Database path: CLI first, then config.
pub fn database_path(config: &RecipebookConfig, args: &SessionArgs) -> PathBuf {
    args.database
        .clone()
        .unwrap_or_else(|| config.database().path)
}

/// Open the catalog database.
pub fn open_database(path: &Path) -> Result<Arc<Database>> {
    let db = Database::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    info!(path = %path.display(), "Opened database");
    Ok(Arc::new(db))
}

/// Build the session store configuration from config and CLI overrides.
pub fn session_config(section: &SessionSection, args: &SessionArgs) -> SessionConfig {
    let max_life = seconds(
        "session lifetime",
        args.max_age.as_deref(),
        section.max_life_time_secs,
        DEFAULT_SESSION_SECS,
    );
    let cleanup = seconds(
        "cleanup interval",
        args.cleanup_interval.as_deref(),
        section.cleanup_interval_secs,
        DEFAULT_SESSION_SECS,
    );

    SessionConfig::new()
        .with_cookie_name(
            args.cookie_name
                .clone()
                .unwrap_or_else(|| section.cookie_name.clone()),
        )
        .with_max_life_time(Duration::from_secs(max_life))
        .with_cleanup_interval(Duration::from_secs(cleanup))
        .with_repopulate_on_fallback(section.repopulate_on_fallback)
}

/// Resolve a duration in seconds: override, then configured value, never zero.
fn seconds(what: &str, raw: Option<&str>, configured: u64, default: u64) -> u64 {
    let value = match raw.map(str::trim) {
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
            warn!("{what} '{raw}' is not a number of seconds, using {configured}");
            configured
        }),
        None => configured,
    };

    if value == 0 {
        warn!("{what} must be positive, using {default}");
        return default;
    }
    value
}
