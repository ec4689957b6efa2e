//! Wishlist repository: teacher CRUD, share-token lookup and browse summaries.

use sqlx::PgPool;

use wishlisted_core::{ShareToken, TeacherId, WishlistId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Wishlist, WishlistSummary};

const WISHLIST_COLUMNS: &str =
    "id, teacher_id, title, description, share_token, is_active, created_at, updated_at";

/// Fresh tokens tried before giving up on an insert.
const SHARE_TOKEN_ATTEMPTS: usize = 3;

// Pledged units per item are summed first so the outer aggregate sees one
// row per item.
const SUMMARY_SELECT: &str = r"
    SELECT
        w.id, w.title, w.description, w.share_token,
        t.full_name AS teacher_name, t.school, t.location, t.grade,
        t.is_teacher_verified AS teacher_verified,
        COUNT(i.id) AS item_count,
        COALESCE(SUM(i.quantity), 0)::BIGINT AS quantity_needed,
        COALESCE(SUM(p.pledged), 0)::BIGINT AS quantity_pledged,
        w.created_at
    FROM wishlists w
    JOIN teachers t ON t.id = w.teacher_id
    LEFT JOIN wishlist_items i ON i.wishlist_id = w.id
    LEFT JOIN LATERAL (
        SELECT SUM(quantity) AS pledged
        FROM pledges
        WHERE item_id = i.id AND status <> 'cancelled'
    ) p ON TRUE
    WHERE w.is_active
    GROUP BY w.id, t.id
    ORDER BY w.created_at DESC, w.id DESC
";

/// Fields a teacher sets on a wishlist.
#[derive(Debug, Clone)]
pub struct WishlistInput {
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a wishlist with a fresh share token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if every generated token collided.
    pub async fn create(
        &self,
        teacher_id: TeacherId,
        input: &WishlistInput,
    ) -> Result<Wishlist, RepositoryError> {
        let mut last_err = RepositoryError::Conflict("share token collision".to_owned());

        for attempt in 1..=SHARE_TOKEN_ATTEMPTS {
            let token = ShareToken::generate();
            let result = sqlx::query_as::<_, Wishlist>(&format!(
                r"
                INSERT INTO wishlists (teacher_id, title, description, share_token, is_active)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {WISHLIST_COLUMNS}
                "
            ))
            .bind(teacher_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(token.as_str())
            .bind(input.is_active)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "share token collision"));

            match result {
                Ok(wishlist) => return Ok(wishlist),
                Err(RepositoryError::Conflict(msg)) => {
                    tracing::warn!(attempt, "Share token collided, retrying");
                    last_err = RepositoryError::Conflict(msg);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }

    /// All wishlists owned by a teacher, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Wishlist>, RepositoryError> {
        let wishlists = sqlx::query_as::<_, Wishlist>(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlists WHERE teacher_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(teacher_id)
        .fetch_all(self.pool)
        .await?;

        Ok(wishlists)
    }

    /// Get a wishlist by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: WishlistId) -> Result<Option<Wishlist>, RepositoryError> {
        let wishlist = sqlx::query_as::<_, Wishlist>(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(wishlist)
    }

    /// Resolve a public share token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_share_token(
        &self,
        token: &ShareToken,
    ) -> Result<Option<Wishlist>, RepositoryError> {
        let wishlist = sqlx::query_as::<_, Wishlist>(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlists WHERE share_token = $1"
        ))
        .bind(token.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(wishlist)
    }

    /// Update a wishlist the teacher owns. The share token never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no wishlist with this ID belongs
    /// to `teacher_id`.
    pub async fn update(
        &self,
        id: WishlistId,
        teacher_id: TeacherId,
        input: &WishlistInput,
    ) -> Result<Wishlist, RepositoryError> {
        sqlx::query_as::<_, Wishlist>(&format!(
            r"
            UPDATE wishlists
            SET title = $3, description = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1 AND teacher_id = $2
            RETURNING {WISHLIST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(teacher_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a wishlist the teacher owns. Items cascade; their pledges keep
    /// their history with a null item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(&self, id: WishlistId, teacher_id: TeacherId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlists WHERE id = $1 AND teacher_id = $2")
            .bind(id)
            .bind(teacher_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Every active wishlist with teacher details and pledge progress.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn browse(&self) -> Result<Vec<WishlistSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistSummary>(SUMMARY_SELECT)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// The `limit` most recently created active wishlists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: u32) -> Result<Vec<WishlistSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistSummary>(&format!("{SUMMARY_SELECT} LIMIT $1"))
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}
