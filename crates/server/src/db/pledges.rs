//! Pledge repository.
//!
//! Reads take the pool. Lifecycle writes are associated functions over a
//! `PgConnection` so the pledge service can run the item lock, quantity
//! check, status write and donor totals in one transaction.

use sqlx::{PgConnection, PgPool};

use wishlisted_core::{
    DonorId, NewPledge, PledgeId, PledgeStatus, TeacherId, WishlistId, WishlistItemId,
};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Pledge, PledgeListing};

const PLEDGE_COLUMNS: &str = "id, item_id, donor_id, amount, quantity, payment_method, status, \
     transaction_reference, message, confirmation_message, \
     created_at, confirmed_at, completed_at, cancelled_at";

const LISTING_SELECT: &str = r"
    SELECT
        p.id, p.item_id, i.name AS item_name, w.id AS wishlist_id, w.title AS wishlist_title,
        t.full_name AS teacher_name,
        CASE WHEN d.is_anonymous THEN 'Anonymous' ELSE d.display_name END AS donor_name,
        p.amount, p.quantity, p.payment_method, p.status, p.transaction_reference,
        p.message, p.confirmation_message, p.created_at, p.confirmed_at, p.completed_at
    FROM pledges p
    JOIN donors d ON d.id = p.donor_id
    LEFT JOIN wishlist_items i ON i.id = p.item_id
    LEFT JOIN wishlists w ON w.id = i.wishlist_id
    LEFT JOIN teachers t ON t.id = w.teacher_id
";

/// An item row held under `FOR UPDATE` while a pledge is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LockedItem {
    pub wishlist_id: WishlistId,
    pub quantity: i32,
    pub is_fulfilled: bool,
    pub is_active: bool,
}

/// Repository for pledge database operations.
pub struct PledgeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PledgeRepository<'a> {
    /// Create a new pledge repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a pledge by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PledgeId) -> Result<Option<Pledge>, RepositoryError> {
        let pledge = sqlx::query_as::<_, Pledge>(&format!(
            "SELECT {PLEDGE_COLUMNS} FROM pledges WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(pledge)
    }

    /// A pledge with its item, wishlist and people resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_listing(&self, id: PledgeId) -> Result<Option<PledgeListing>, RepositoryError> {
        let listing = sqlx::query_as::<_, PledgeListing>(&format!("{LISTING_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(listing)
    }

    /// A donor's pledges, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_donor(
        &self,
        donor_id: DonorId,
    ) -> Result<Vec<PledgeListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, PledgeListing>(&format!(
            "{LISTING_SELECT} WHERE p.donor_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(donor_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Pledges against a teacher's items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PledgeListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, PledgeListing>(&format!(
            "{LISTING_SELECT} WHERE w.teacher_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(teacher_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Teacher who owns the item a pledge was made against.
    ///
    /// `None` once the item has been deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn teacher_for(&self, id: PledgeId) -> Result<Option<TeacherId>, RepositoryError> {
        let teacher_id = sqlx::query_scalar::<_, TeacherId>(
            r"
            SELECT w.teacher_id
            FROM pledges p
            JOIN wishlist_items i ON i.id = p.item_id
            JOIN wishlists w ON w.id = i.wishlist_id
            WHERE p.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(teacher_id)
    }

    // -------------------------------------------------------------------------
    // Transactional steps
    // -------------------------------------------------------------------------

    /// Lock an item row for the rest of the transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_item(
        conn: &mut PgConnection,
        item_id: WishlistItemId,
    ) -> Result<Option<LockedItem>, RepositoryError> {
        let item = sqlx::query_as::<_, LockedItem>(
            r"
            SELECT i.wishlist_id, i.quantity, i.is_fulfilled, w.is_active
            FROM wishlist_items i
            JOIN wishlists w ON w.id = i.wishlist_id
            WHERE i.id = $1
            FOR UPDATE OF i
            ",
        )
        .bind(item_id)
        .fetch_optional(conn)
        .await?;

        Ok(item)
    }

    /// Units already pledged against an item, ignoring cancelled pledges.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pledged_quantity(
        conn: &mut PgConnection,
        item_id: WishlistItemId,
    ) -> Result<i64, RepositoryError> {
        let pledged = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM pledges WHERE item_id = $1 AND status <> 'cancelled'",
        )
        .bind(item_id)
        .fetch_one(conn)
        .await?;

        Ok(pledged)
    }

    /// Insert a pending pledge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the reference is already taken.
    pub async fn insert(
        conn: &mut PgConnection,
        donor_id: DonorId,
        item_id: WishlistItemId,
        input: &NewPledge,
        reference: &str,
    ) -> Result<Pledge, RepositoryError> {
        sqlx::query_as::<_, Pledge>(&format!(
            r"
            INSERT INTO pledges (
                item_id, donor_id, amount, quantity, payment_method,
                status, transaction_reference, message
            )
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7)
            RETURNING {PLEDGE_COLUMNS}
            "
        ))
        .bind(item_id)
        .bind(donor_id)
        .bind(input.amount)
        .bind(input.quantity)
        .bind(input.payment_method)
        .bind(reference)
        .bind(&input.message)
        .fetch_one(conn)
        .await
        .map_err(|e| conflict_on_unique(e, "transaction reference already in use"))
    }

    /// Lock a pledge row for the rest of the transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(conn: &mut PgConnection, id: PledgeId) -> Result<Option<Pledge>, RepositoryError> {
        let pledge = sqlx::query_as::<_, Pledge>(&format!(
            "SELECT {PLEDGE_COLUMNS} FROM pledges WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(pledge)
    }

    /// Move a donor's pledge from `from` to `to` and stamp the matching
    /// timestamp column.
    ///
    /// `confirmation_message` is only written when `Some`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::StaleState` if the pledge is no longer in
    /// `from` or does not belong to `donor_id`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: PledgeId,
        donor_id: DonorId,
        from: PledgeStatus,
        to: PledgeStatus,
        confirmation_message: Option<&str>,
    ) -> Result<Pledge, RepositoryError> {
        let stamp = match to {
            PledgeStatus::Confirmed => "confirmed_at",
            PledgeStatus::Completed => "completed_at",
            PledgeStatus::Cancelled => "cancelled_at",
            PledgeStatus::Pending => {
                return Err(RepositoryError::DataCorruption(
                    "pledges cannot return to pending".to_owned(),
                ));
            }
        };

        sqlx::query_as::<_, Pledge>(&format!(
            r"
            UPDATE pledges
            SET status = $4,
                {stamp} = NOW(),
                confirmation_message = COALESCE($5, confirmation_message),
                updated_at = NOW()
            WHERE id = $1 AND donor_id = $2 AND status = $3
            RETURNING {PLEDGE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(donor_id)
        .bind(from)
        .bind(to)
        .bind(confirmation_message)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::StaleState)
    }
}
