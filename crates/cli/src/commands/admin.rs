//! Admin account management.
//!
//! Admins cannot sign up through the API. An operator registers the account
//! normally and then promotes it here.

use thiserror::Error;

use wishlisted_core::{Email, EmailError, UserRole};
use wishlisted_server::db::{RepositoryError, UserRepository};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("No account registered with email: {0}")]
    UserNotFound(Email),

    #[error("Database error: {0}")]
    Repository(RepositoryError),
}

/// Grant the admin role to the account registered under `email`.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .set_role(&email, UserRole::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UserNotFound(email.clone()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        "Account promoted to admin, signed-in sessions pick up the role on their next request"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_promote_rejects_bad_email_before_connecting() {
        let err = promote("not-an-email").await.unwrap_err();
        assert!(matches!(err, AdminError::InvalidEmail(_)));
    }
}
