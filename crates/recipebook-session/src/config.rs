//! Configuration for the session store.

use std::time::Duration;

use chrono::TimeDelta;

/// Default session lifetime (one hour).
pub const DEFAULT_MAX_LIFE_TIME: Duration = Duration::from_secs(3600);

/// Default interval between cleanup passes (one hour).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Default name of the cookie carrying the session token.
pub const DEFAULT_COOKIE_NAME: &str = "recipebook_sid";

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    /// Absolute lifetime of a session, measured from login.
    pub max_life_time: Duration,

    /// Period of the background cleanup task.
    pub cleanup_interval: Duration,

    /// Whether a session found only in durable storage is written back into
    /// the in-memory cache.
    pub repopulate_on_fallback: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_life_time: DEFAULT_MAX_LIFE_TIME,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            repopulate_on_fallback: true,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the session lifetime. A zero lifetime falls back to the default.
    pub fn with_max_life_time(mut self, max_life_time: Duration) -> Self {
        self.max_life_time = if max_life_time.is_zero() {
            DEFAULT_MAX_LIFE_TIME
        } else {
            max_life_time
        };
        self
    }

    /// Set the cleanup interval. A zero interval falls back to the default.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = if interval.is_zero() {
            DEFAULT_CLEANUP_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Enable or disable writing fallback hits back into the cache.
    pub fn with_repopulate_on_fallback(mut self, enabled: bool) -> Self {
        self.repopulate_on_fallback = enabled;
        self
    }

    /// Session lifetime as a chrono delta, for timestamp arithmetic.
    pub fn max_life(&self) -> TimeDelta {
        TimeDelta::from_std(self.max_life_time).unwrap_or(TimeDelta::MAX)
    }

    /// Cookie `Max-Age` in whole seconds.
    pub fn max_age_secs(&self) -> u64 {
        self.max_life_time.as_secs()
    }
}
