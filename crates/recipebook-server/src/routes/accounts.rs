//! Account endpoints: registration, login and logout.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use recipebook_session::{UserId, token_prefix};

use super::required_field;
use crate::auth::{clear_session_cookie, cookie_value, session_cookie, set_cookie_header};
use crate::error::{Result, ServerError};
use crate::password::{hash_password, verify_password};
use crate::state::AppState;

// ── Request/Response types ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub fullname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
}

const INVALID_CREDENTIALS: &str = "invalid username or password";

// ── Handlers ────────────────────────────────────────────────────────

/// POST /register
pub async fn register_handler(
    State(state): State<AppState>,
    form: std::result::Result<Form<RegisterForm>, FormRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Form(form) = form?;
    let username = required_field("username", form.username.as_deref())?;
    let password = required_field("password", form.password.as_deref())?;
    let full_name = required_field("fullname", form.fullname.as_deref())?;

    if state.db.user_exists(&username)? {
        return Err(ServerError::BadRequest("user already exists".to_string()));
    }

    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServerError::Internal(format!("hashing task failed: {e}")))??;

    let user = state.db.create_user(&username, &full_name, &hash)?;
    info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
        }),
    ))
}

/// POST /login
///
/// A session cookie already held by the same user is reused, and the new
/// cookie's `Max-Age` is what is left of that session's lifetime.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Response> {
    let Form(form) = form?;
    let username = required_field("username", form.username.as_deref())?;
    let password = required_field("password", form.password.as_deref())?;

    let Some(user) = state.db.find_active_user(&username)? else {
        warn!(username = %username, "Login for unknown or disabled user");
        return Err(ServerError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ServerError::Internal(format!("verification task failed: {e}")))?;
    if !verified {
        warn!(user_id = user.id, "Login with wrong password");
        return Err(ServerError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let config = state.sessions.config();
    let session = state
        .sessions
        .start(cookie_value(&headers, &config.cookie_name), user.id)?;
    info!(
        user_id = user.id,
        token_prefix = %token_prefix(&session.token),
        "User logged in"
    );

    let remaining = state.sessions.remaining_life(&session);
    let max_age = (remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0))
        .min(config.max_age_secs());
    let cookie = session_cookie(&config.cookie_name, &session.token, max_age);
    Ok((set_cookie_header(cookie)?, Redirect::to("/")).into_response())
}

/// POST /logout
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let cookie_name = &state.sessions.config().cookie_name;
    let token = cookie_value(&headers, cookie_name)
        .ok_or_else(|| ServerError::Unauthorized("Missing session cookie".to_string()))?;

    state.sessions.destroy(token)?;

    let cookie = clear_session_cookie(cookie_name);
    Ok((set_cookie_header(cookie)?, Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};
    use recipebook_session::{ManualClock, SessionConfig, SessionStore};
    use recipebook_store::Database;
    use tower::ServiceExt;

    use crate::Server;
    use crate::config::ServerConfig;
    use crate::state::AppState;
    use crate::test_support::test_state;

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn status(app: &Router, request: Request<Body>) -> StatusCode {
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let app = Server::from_state(test_state()).router();

        let missing = form("/register", "username=alice&password=pw");
        assert_eq!(status(&app, missing).await, StatusCode::BAD_REQUEST);

        let blank = form("/register", "username=%20%20&password=pw&fullname=Alice");
        assert_eq!(status(&app, blank).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let app = Server::from_state(test_state()).router();
        let body = "username=alice&password=pw&fullname=Alice%20Liddell";

        assert_eq!(status(&app, form("/register", body)).await, StatusCode::CREATED);
        assert_eq!(status(&app, form("/register", body)).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let state = test_state();
        let app = Server::from_state(state.clone()).router();
        status(&app, form("/register", "username=bob&password=pw&fullname=Bob")).await;

        let response = app
            .clone()
            .oneshot(form("/login", "username=bob&password=pw"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("recipebook_sid="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert_eq!(state.sessions.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_relogin_cookie_keeps_original_expiry() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sessions =
            SessionStore::with_clock(SessionConfig::default(), Arc::clone(&db), clock.clone());
        let state = AppState::new(db, sessions, ServerConfig::new().with_rate_limiting(false));
        let app = Server::from_state(state).router();
        status(&app, form("/register", "username=fay&password=pw&fullname=Fay")).await;

        let first = app
            .clone()
            .oneshot(form("/login", "username=fay&password=pw"))
            .await
            .unwrap();
        let first_cookie = first.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(first_cookie.contains("Max-Age=3600"));
        let pair = first_cookie.split(';').next().unwrap().to_string();

        clock.advance(TimeDelta::seconds(600));
        let mut again = form("/login", "username=fay&password=pw");
        again
            .headers_mut()
            .insert(header::COOKIE, pair.parse().unwrap());
        let second = app.clone().oneshot(again).await.unwrap();

        let second_cookie = second.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(second_cookie.starts_with(&pair));
        assert!(second_cookie.contains("Max-Age=3000"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let state = test_state();
        let app = Server::from_state(state.clone()).router();
        status(&app, form("/register", "username=carol&password=pw&fullname=Carol")).await;

        let wrong = form("/login", "username=carol&password=nope");
        assert_eq!(status(&app, wrong).await, StatusCode::UNAUTHORIZED);

        let unknown = form("/login", "username=dave&password=pw");
        assert_eq!(status(&app, unknown).await, StatusCode::UNAUTHORIZED);

        let user = state.db.find_user("carol").unwrap().unwrap();
        state.db.set_user_disabled(user.id, true).unwrap();
        let disabled = form("/login", "username=carol&password=pw");
        assert_eq!(status(&app, disabled).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_without_cookie() {
        let app = Server::from_state(test_state()).router();
        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status(&app, request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_destroys_session() {
        let state = test_state();
        let app = Server::from_state(state.clone()).router();
        let user = state.db.create_user("erin", "Erin", "unused").unwrap();
        let session = state.sessions.start(None, user.id).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, format!("recipebook_sid={}", session.token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert!(state.sessions.read(&session.token).unwrap().is_none());
    }
}
