//! Error types for session operations.

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No active session exists for the token (absent, expired or destroyed).
    #[error("Session not found")]
    NotFound,

    /// Error from the durable session store.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SessionError {
    /// Wrap any displayable backend error as a persistence failure.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
