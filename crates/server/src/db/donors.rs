//! Donor profile repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use wishlisted_core::{DonorId, UserId};

use super::RepositoryError;
use crate::models::Donor;

const DONOR_COLUMNS: &str = "id, user_id, display_name, phone, is_anonymous, \
     total_pledged, total_donated, created_at, updated_at";

/// Fields a donor can edit on their own profile.
#[derive(Debug, Clone)]
pub struct DonorProfileInput {
    pub display_name: String,
    pub phone: Option<String>,
    pub is_anonymous: bool,
}

/// Change to apply to a donor's running totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TotalsDelta {
    pub pledged: Decimal,
    pub donated: Decimal,
}

/// Repository for donor database operations.
pub struct DonorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DonorRepository<'a> {
    /// Create a new donor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the donor profile owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Donor>, RepositoryError> {
        let donor = sqlx::query_as::<_, Donor>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(donor)
    }

    /// Create or update the single profile row for `user_id`.
    ///
    /// Totals are never touched here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        input: &DonorProfileInput,
    ) -> Result<Donor, RepositoryError> {
        let donor = sqlx::query_as::<_, Donor>(&format!(
            r"
            INSERT INTO donors (user_id, display_name, phone, is_anonymous)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                phone = EXCLUDED.phone,
                is_anonymous = EXCLUDED.is_anonymous,
                updated_at = NOW()
            RETURNING {DONOR_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&input.display_name)
        .bind(&input.phone)
        .bind(input.is_anonymous)
        .fetch_one(self.pool)
        .await?;

        Ok(donor)
    }

    /// Adjust running totals inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the donor row is gone.
    pub async fn apply_totals(
        conn: &mut PgConnection,
        id: DonorId,
        delta: TotalsDelta,
    ) -> Result<(), RepositoryError> {
        if delta == TotalsDelta::default() {
            return Ok(());
        }

        let result = sqlx::query(
            r"
            UPDATE donors
            SET total_pledged = total_pledged + $2,
                total_donated = total_donated + $3,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(delta.pledged)
        .bind(delta.donated)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
