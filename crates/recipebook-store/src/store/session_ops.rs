//! Durable session records.

use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use recipebook_session::{Session, SessionError, SessionPersistence, token_prefix};

use crate::error::{Result, StoreError};

use super::Database;

impl Database {
    /// Record a newly issued session.
    pub fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, login_time) VALUES (?1, ?2, ?3)",
            params![
                session.token,
                session.user_id,
                session.login_time.timestamp_micros()
            ],
        )?;
        debug!(
            token_prefix = token_prefix(&session.token),
            user_id = session.user_id,
            "Inserted session"
        );
        Ok(())
    }

    /// Find a session that is still active at `now` and belongs to an enabled user.
    pub fn find_active_session(
        &self,
        token: &str,
        max_life: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>> {
        // now < login_time + max_life  <=>  login_time > now - max_life
        let cutoff = now
            .checked_sub_signed(max_life)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let row = self
            .conn()
            .query_row(
                "SELECT s.token, s.user_id, s.login_time
                 FROM sessions s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1
                   AND u.is_disabled = 0
                   AND s.login_time > ?2",
                params![token, cutoff.timestamp_micros()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(token, user_id, micros)| {
            let login_time = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
                StoreError::InvalidData(format!("session login_time out of range: {micros}"))
            })?;
            Ok(Session::new(token, user_id, login_time))
        })
        .transpose()
    }

    /// Delete a session by token. Unknown tokens are ignored.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        debug!(token_prefix = token_prefix(token), removed, "Deleted session");
        Ok(())
    }

    /// Delete every session issued before `cutoff`.
    pub fn delete_sessions_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM sessions WHERE login_time < ?1",
            params![cutoff.timestamp_micros()],
        )?;
        Ok(removed)
    }

    /// Number of stored sessions, expired ones included.
    pub fn session_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl SessionPersistence for Database {
    fn insert(&self, session: &Session) -> recipebook_session::Result<()> {
        self.insert_session(session).map_err(SessionError::persistence)
    }

    fn find_active(
        &self,
        token: &str,
        max_life: TimeDelta,
        now: DateTime<Utc>,
    ) -> recipebook_session::Result<Option<Session>> {
        self.find_active_session(token, max_life, now)
            .map_err(SessionError::persistence)
    }

    fn delete(&self, token: &str) -> recipebook_session::Result<()> {
        self.delete_session(token).map_err(SessionError::persistence)
    }

    fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> recipebook_session::Result<usize> {
        self.delete_sessions_before(cutoff)
            .map_err(SessionError::persistence)
    }
}
