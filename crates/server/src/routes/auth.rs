//! Account routes: sign-up, sign-in, sign-out and the current user.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use wishlisted_core::UserRole;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthService, UserProfile};
use crate::state::AppState;

/// Sign-up request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: UserRole,
}

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };

    set_current_user(session, &current).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to set session");
        AppError::Internal("session store unavailable".to_string())
    })?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(())
}

/// Create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(&body.email, &body.password, &body.password_confirm, body.role)
        .await?;

    start_session(&session, &user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Sign in with email and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Json(user))
}

/// Sign out. Succeeds whether or not anyone was signed in.
pub async fn logout(OptionalAuth(user): OptionalAuth, session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to clear session");
        AppError::Internal("session store unavailable".to_string())
    })?;
    clear_sentry_user();

    if let Some(user) = user {
        tracing::info!(user_id = %user.id, "User signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/user`: the signed-in user with profile IDs.
pub async fn current_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserProfile>> {
    let profile = AuthService::new(state.pool())
        .current_user_profile(user.id)
        .await?;

    Ok(Json(profile))
}
