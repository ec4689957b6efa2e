//! Authentication extractors and the role check every route runs.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use wishlisted_core::{Capability, UserRole};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Rejects with `401` and a JSON body when there is no session user or the
/// account no longer exists. The role is read back from `users` on every
/// request, so a role granted from the CLI applies to live sessions.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`].
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Sign in to continue" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AuthRejection.into_response())?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AuthRejection.into_response())?;

        let stored = UserRepository::new(state.pool())
            .get_by_id(user.id)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        let Some(stored) = stored else {
            tracing::info!(user_id = %user.id, "Session user no longer exists");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Could not drop stale session");
            }
            return Err(AuthRejection.into_response());
        };

        let (user, changed) = with_current_role(user, stored.role);
        if changed {
            tracing::info!(user_id = %user.id, role = %user.role, "Session role refreshed");
            if let Err(e) = session.insert(session_keys::CURRENT_USER, &user).await {
                tracing::warn!(error = %e, "Could not store refreshed role");
            }
        }

        Ok(Self(user))
    }
}

/// Swap in the role currently stored for the user. The flag is set when it
/// differs from what the session held.
#[must_use]
pub fn with_current_role(mut user: CurrentUser, role: UserRole) -> (CurrentUser, bool) {
    let changed = user.role != role;
    user.role = role;
    (user, changed)
}

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Fail with `403` unless the user's role grants `capability`.
///
/// # Errors
///
/// Returns `AppError::Forbidden`.
pub fn require_capability(user: &CurrentUser, capability: Capability) -> Result<(), AppError> {
    if user.can(capability) {
        Ok(())
    } else {
        tracing::debug!(user_id = %user.id, role = %user.role, ?capability, "Capability denied");
        Err(AppError::Forbidden(format!(
            "{} accounts cannot do this",
            user.role
        )))
    }
}

/// Store the signed-in user in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the whole session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wishlisted_core::{Email, UserId};

    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            email: Email::parse("someone@school.bs").unwrap(),
            role,
        }
    }

    #[test]
    fn test_capability_checks_follow_role() {
        assert!(require_capability(&user(UserRole::Teacher), Capability::ManageWishlists).is_ok());
        assert!(require_capability(&user(UserRole::Donor), Capability::ManageWishlists).is_err());
        assert!(require_capability(&user(UserRole::Donor), Capability::Pledge).is_ok());
        assert!(require_capability(&user(UserRole::Admin), Capability::ReviewTeachers).is_ok());
        assert!(require_capability(&user(UserRole::Teacher), Capability::ReviewTeachers).is_err());
    }

    #[test]
    fn test_promoted_role_replaces_session_role() {
        let (refreshed, changed) = with_current_role(user(UserRole::Donor), UserRole::Admin);
        assert!(changed);
        assert_eq!(refreshed.role, UserRole::Admin);
        assert!(require_capability(&refreshed, Capability::ReviewTeachers).is_ok());
    }

    #[test]
    fn test_unchanged_role_is_not_rewritten() {
        let (same, changed) = with_current_role(user(UserRole::Teacher), UserRole::Teacher);
        assert!(!changed);
        assert_eq!(same.role, UserRole::Teacher);
    }

    #[test]
    fn test_rejection_is_unauthorized() {
        assert_eq!(AuthRejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
