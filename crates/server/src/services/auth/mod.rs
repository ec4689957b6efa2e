//! Authentication service.
//!
//! Email and password accounts with a role chosen at sign-up.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Serialize;
use sqlx::PgPool;

use wishlisted_core::{DonorId, Email, TeacherId, UserId, UserRole, validation};

use crate::db::{DonorRepository, RepositoryError, TeacherRepository, UserRepository};
use crate::models::User;

/// The signed-in user as returned by `GET /api/auth/user`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub teacher_id: Option<TeacherId>,
    pub donor_id: Option<DonorId>,
    /// Whether the teacher profile has everything needed for review.
    pub is_verified: bool,
    /// Whether an admin has approved the teacher.
    pub is_teacher_verified: bool,
}

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
        }
    }

    /// Register a new teacher or donor account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Validation` if the password is too short or the
    /// confirmation differs.
    /// Returns `AuthError::RoleNotAllowed` for `admin`.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirm: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validation::validate_password(password, password_confirm)?;

        if !role.is_self_service() {
            return Err(AuthError::RoleNotAllowed);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// The user with the profile IDs their role owns.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account was deleted.
    pub async fn current_user_profile(&self, user_id: UserId) -> Result<UserProfile, AuthError> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let mut profile = UserProfile {
            user,
            teacher_id: None,
            donor_id: None,
            is_verified: false,
            is_teacher_verified: false,
        };

        match profile.user.role {
            UserRole::Teacher => {
                if let Some(teacher) = TeacherRepository::new(self.pool).get_by_user(user_id).await? {
                    profile.teacher_id = Some(teacher.id);
                    profile.is_verified = teacher.is_verified;
                    profile.is_teacher_verified = teacher.is_teacher_verified;
                }
            }
            UserRole::Donor => {
                profile.donor_id = DonorRepository::new(self.pool)
                    .get_by_user(user_id)
                    .await?
                    .map(|d| d.id);
            }
            UserRole::Admin => {}
        }

        Ok(profile)
    }
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("chalkboard").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("chalkboard", &hash).is_ok());
        assert!(matches!(
            verify_password("whiteboard", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
