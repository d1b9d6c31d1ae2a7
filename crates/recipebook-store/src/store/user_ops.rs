//! Account operations.

use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use recipebook_session::UserId;

use crate::error::{Result, StoreError};
use crate::types::User;

use super::{Database, format_dt, parse_dt};

const USER_COLUMNS: &str = "id, username, full_name, password_hash, is_disabled, created_at";

impl Database {
    /// Register a new account.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the username is taken,
    /// disabled accounts included.
    pub fn create_user(&self, username: &str, full_name: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();

        let result = self.conn().execute(
            "INSERT INTO users (username, full_name, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![username, full_name, password_hash, format_dt(&now)],
        );

        match result {
            Ok(_) => {}
            Err(e) if StoreError::is_constraint(&e) => {
                return Err(StoreError::AlreadyExists(format!("user {username}")));
            }
            Err(e) => return Err(e.into()),
        }

        let user = self
            .find_user(username)?
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))?;
        debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    /// Whether any account, enabled or not, uses this username.
    pub fn user_exists(&self, username: &str) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Look up an account by username, disabled or not.
    pub fn find_user(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![username], row_to_user)
            .optional()?)
    }

    /// Look up an account that is allowed to log in.
    pub fn find_active_user(&self, username: &str) -> Result<Option<User>> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND is_disabled = 0");
        Ok(self
            .conn()
            .query_row(&sql, params![username], row_to_user)
            .optional()?)
    }

    /// Look up an account by id.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(self
            .conn()
            .query_row(&sql, params![id], row_to_user)
            .optional()?)
    }

    /// Enable or disable an account.
    pub fn set_user_disabled(&self, id: UserId, disabled: bool) -> Result<()> {
        let updated = self.conn().execute(
            "UPDATE users SET is_disabled = ?1 WHERE id = ?2",
            params![disabled, id],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }
        debug!(user_id = id, disabled, "Updated user status");
        Ok(())
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        password_hash: row.get(3)?,
        is_disabled: row.get(4)?,
        created_at: parse_dt(&row.get::<_, String>(5)?)?,
    })
}
