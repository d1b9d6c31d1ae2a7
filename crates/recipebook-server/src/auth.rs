//! Cookie session authentication.
//!
//! The session token travels in an HTTP-only cookie. Handlers that need an
//! authenticated caller take an [`AuthSession`] argument; the extractor
//! resolves the cookie through the session store and rejects the request
//! with 401 when no active session exists.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use tracing::debug;

use recipebook_session::{Session, SessionError, token_prefix};

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Auth Error
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication error.
#[derive(Debug)]
pub enum AuthError {
    /// No session cookie on the request.
    MissingSession,
    /// The cookie names no active session (unknown, expired or destroyed).
    InvalidSession,
    /// The session store could not answer.
    Store(SessionError),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "Missing session cookie"),
            AuthError::InvalidSession => write!(f, "Session expired or invalid"),
            AuthError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Store(e) => ServerError::from(e).into_response(),
            other => ServerError::Unauthorized(other.to_string()).into_response(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cookies
// ─────────────────────────────────────────────────────────────────────────────

/// Read a cookie value from the request headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value issuing a session token.
pub fn session_cookie(name: &str, token: &str, max_age_secs: u64) -> String {
    format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Build a `(SET_COOKIE, value)` header pair.
pub(crate) fn set_cookie_header(
    cookie: String,
) -> Result<[(HeaderName, HeaderValue); 1], ServerError> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ServerError::Internal(format!("invalid cookie header: {e}")))?;
    Ok([(SET_COOKIE, value)])
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────────────────────────

/// The caller's active session.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_name = &state.sessions.config().cookie_name;
        let token = cookie_value(&parts.headers, cookie_name).ok_or(AuthError::MissingSession)?;

        match state.sessions.read(token) {
            Ok(Some(session)) => Ok(AuthSession(session)),
            Ok(None) => {
                debug!(token_prefix = %token_prefix(token), "Rejected inactive session");
                Err(AuthError::InvalidSession)
            }
            Err(e) => Err(AuthError::Store(e)),
        }
    }
}

impl AuthError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
