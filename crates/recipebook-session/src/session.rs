//! The session record and its expiry rule.

use chrono::{DateTime, TimeDelta, Utc};

/// Identifier of the user a session belongs to.
///
/// Sessions only reference users; they never own user records.
pub type UserId = i64;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque URL-safe token handed to the client.
    pub token: String,

    /// User the session was issued to.
    pub user_id: UserId,

    /// When the session was issued.
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// Create a new session record.
    pub fn new(token: impl Into<String>, user_id: UserId, login_time: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            user_id,
            login_time,
        }
    }

    /// The first instant at which the session is no longer valid.
    pub fn expires_at(&self, max_life: TimeDelta) -> DateTime<Utc> {
        self.login_time
            .checked_add_signed(max_life)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the session is valid at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>, max_life: TimeDelta) -> bool {
        now < self.expires_at(max_life)
    }
}
