//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]      # listener, rate limiting, request logging
//! [database]    # SQLite file
//! [session]     # cookie name, lifetime, cleanup cadence
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default port for the HTTP listener.
pub const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default API rate limit per client IP.
pub const DEFAULT_API_RPM: u32 = 120;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "recipebook.db";

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "recipebook_sid";

/// Default session lifetime and cleanup period, in seconds.
pub const DEFAULT_SESSION_SECS: u64 = 3600;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipebookConfig {
    /// HTTP server configuration.
    pub server: Option<ServerConfig>,

    /// Database configuration.
    pub database: Option<DatabaseConfig>,

    /// Session configuration.
    pub session: Option<SessionSection>,
}

impl RecipebookConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field.
    pub fn merge(&mut self, other: RecipebookConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
    }

    /// The `[server]` section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// The `[database]` section, or defaults.
    pub fn database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }

    /// The `[session]` section, or defaults.
    pub fn session(&self) -> SessionSection {
        self.session.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Server configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Enable rate limiting.
    pub rate_limiting: bool,
    /// API rate limit: requests per minute per IP.
    pub api_rpm: u32,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            rate_limiting: true,
            api_rpm: DEFAULT_API_RPM,
            request_logging: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Database Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Database configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session configuration section.
///
/// ```toml
/// [session]
/// cookie_name = "recipebook_sid"
/// max_life_time_secs = 3600
/// cleanup_interval_secs = 3600
/// repopulate_on_fallback = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Session lifetime in seconds. Zero falls back to the default.
    pub max_life_time_secs: u64,
    /// Seconds between expired-session cleanup passes. Zero falls back to the default.
    pub cleanup_interval_secs: u64,
    /// Write sessions found only in the database back into the in-memory cache.
    pub repopulate_on_fallback: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_life_time_secs: DEFAULT_SESSION_SECS,
            cleanup_interval_secs: DEFAULT_SESSION_SECS,
            repopulate_on_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = RecipebookConfig::from_toml("").unwrap();
        assert_eq!(config, RecipebookConfig::new());
        assert_eq!(config.server(), ServerConfig::default());
        assert_eq!(config.session().cookie_name, "recipebook_sid");
        assert_eq!(config.database().path, PathBuf::from("recipebook.db"));
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let config = RecipebookConfig::from_toml(
            r#"
[server]
port = 9000

[session]
max_life_time_secs = 60
"#,
        )
        .unwrap();

        let server = config.server();
        assert_eq!(server.port, 9000);
        assert_eq!(server.bind, "127.0.0.1");
        assert!(server.rate_limiting);

        let session = config.session();
        assert_eq!(session.max_life_time_secs, 60);
        assert_eq!(session.cleanup_interval_secs, 3600);
        assert!(session.repopulate_on_fallback);
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = RecipebookConfig::from_toml(
            r#"
[server]
port = 8080
[database]
path = "/var/lib/recipebook/base.db"
"#,
        )
        .unwrap();
        let overlay = RecipebookConfig::from_toml(
            r#"
[server]
port = 3000
"#,
        )
        .unwrap();

        base.merge(overlay);
        assert_eq!(base.server().port, 3000);
        assert_eq!(
            base.database().path,
            PathBuf::from("/var/lib/recipebook/base.db")
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RecipebookConfig {
            server: Some(ServerConfig::default()),
            database: None,
            session: Some(SessionSection {
                repopulate_on_fallback: false,
                ..Default::default()
            }),
        };
        let toml = config.to_toml().unwrap();
        assert_eq!(RecipebookConfig::from_toml(&toml).unwrap(), config);
    }
}
