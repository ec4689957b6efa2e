//! Database access for the WishListED `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` / `user_passwords` - Accounts and Argon2 password hashes
//! - `teachers` - Teacher profiles, verification flags and banking details
//! - `teacher_reviews` - Admin approve/reject log
//! - `donors` - Donor profiles and running totals
//! - `wishlists` / `wishlist_items` - Shareable lists and ordered items
//! - `pledges` - Donor pledges and their lifecycle timestamps
//! - `tower_sessions.session` - Session storage (created by `wl-cli migrate`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p wishlisted-cli -- migrate
//! ```
//!
//! Queries use runtime-checked `sqlx::query_as` with `FromRow` models, so the
//! crate builds without a live database.

pub mod donors;
pub mod items;
pub mod pledges;
pub mod teachers;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use donors::DonorRepository;
pub use items::ItemRepository;
pub use pledges::PledgeRepository;
pub use teachers::TeacherRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A guarded update matched no rows because the row changed underneath it.
    #[error("record was modified concurrently")]
    StaleState,
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(message.to_owned());
        }
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
