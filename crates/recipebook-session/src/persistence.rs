//! Durable storage hook for sessions.
//!
//! The [`SessionStore`](crate::SessionStore) treats its in-memory map as an
//! accelerator only. Whenever the map cannot answer, the backend implementing
//! [`SessionPersistence`] is the arbiter of whether a token is still active.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::error::Result;
use crate::session::Session;

/// Trait for durable session backends.
///
/// Implementations may block on I/O. The session store never calls them while
/// holding its cache lock.
pub trait SessionPersistence: Send + Sync {
    /// Record a newly issued session.
    fn insert(&self, session: &Session) -> Result<()>;

    /// Look up a session that is still active at `now`.
    ///
    /// Must apply the same rule as [`Session::is_active_at`]: return `Ok(None)`
    /// when `now >= login_time + max_life` or when the token is unknown.
    fn find_active(
        &self,
        token: &str,
        max_life: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>>;

    /// Delete a session by token. Deleting an unknown token is not an error.
    fn delete(&self, token: &str) -> Result<()>;

    /// Delete every session issued before `cutoff`, returning how many were removed.
    fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

impl<P: SessionPersistence + ?Sized> SessionPersistence for Arc<P> {
    fn insert(&self, session: &Session) -> Result<()> {
        (**self).insert(session)
    }

    fn find_active(
        &self,
        token: &str,
        max_life: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        (**self).find_active(token, max_life, now)
    }

    fn delete(&self, token: &str) -> Result<()> {
        (**self).delete(token)
    }

    fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        (**self).delete_expired_before(cutoff)
    }
}

/// Process-local persistence, for tests and single-process setups without a database.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryPersistence {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn insert(&self, session: &Session) -> Result<()> {
        self.sessions
            .lock()
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    fn find_active(
        &self,
        token: &str,
        max_life: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .get(token)
            .filter(|s| s.is_active_at(now, max_life))
            .cloned())
    }

    fn delete(&self, token: &str) -> Result<()> {
        self.sessions.lock().remove(token);
        Ok(())
    }

    fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.login_time >= cutoff);
        Ok(before - sessions.len())
    }
}
