//! Wishlist item repository.
//!
//! Every row is returned with `pledged_quantity`, the sum of non-cancelled
//! pledges against it, so callers never store a remaining count.

use rust_decimal::Decimal;
use sqlx::PgPool;

use wishlisted_core::{ItemPriority, TeacherId, WishlistId, WishlistItemId};

use super::RepositoryError;
use crate::models::WishlistItem;

// Select list over an item source aliased `i`.
const ITEM_FIELDS: &str = r"
    i.id, i.wishlist_id, i.name, i.description, i.quantity, i.estimated_price,
    i.product_url, i.priority, i.is_fulfilled, i.sort_order,
    COALESCE((
        SELECT SUM(p.quantity) FROM pledges p
        WHERE p.item_id = i.id AND p.status <> 'cancelled'
    ), 0)::BIGINT AS pledged_quantity,
    i.created_at, i.updated_at
";

// Restricts a write to items on wishlists the teacher ($2) owns.
const OWNED_BY_TEACHER: &str =
    "wishlist_id IN (SELECT id FROM wishlists WHERE teacher_id = $2)";

/// Fields a teacher sets on an item.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub estimated_price: Option<Decimal>,
    pub product_url: Option<String>,
    pub priority: ItemPriority,
    /// `None` leaves the flag as it is. Ignored on create.
    pub is_fulfilled: Option<bool>,
}

/// Repository for wishlist item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Items on a wishlist: high priority first, then the teacher's order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_wishlist(
        &self,
        wishlist_id: WishlistId,
    ) -> Result<Vec<WishlistItem>, RepositoryError> {
        let items = sqlx::query_as::<_, WishlistItem>(&format!(
            r"
            SELECT {ITEM_FIELDS}
            FROM wishlist_items i
            WHERE i.wishlist_id = $1
            ORDER BY
                CASE i.priority WHEN 'high' THEN 0 WHEN 'standard' THEN 1 ELSE 2 END,
                i.sort_order, i.id
            "
        ))
        .bind(wishlist_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: WishlistItemId) -> Result<Option<WishlistItem>, RepositoryError> {
        let item = sqlx::query_as::<_, WishlistItem>(&format!(
            "SELECT {ITEM_FIELDS} FROM wishlist_items i WHERE i.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// Append an item to the end of a wishlist.
    ///
    /// Ownership of the wishlist is checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        wishlist_id: WishlistId,
        input: &ItemInput,
    ) -> Result<WishlistItem, RepositoryError> {
        let item = sqlx::query_as::<_, WishlistItem>(&format!(
            r"
            WITH i AS (
                INSERT INTO wishlist_items (
                    wishlist_id, name, description, quantity, estimated_price,
                    product_url, priority, sort_order
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7,
                    (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM wishlist_items WHERE wishlist_id = $1)
                )
                RETURNING *
            )
            SELECT {ITEM_FIELDS} FROM i
            "
        ))
        .bind(wishlist_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.estimated_price)
        .bind(&input.product_url)
        .bind(input.priority)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Update an item on one of the teacher's wishlists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist or is
    /// not the teacher's.
    pub async fn update(
        &self,
        id: WishlistItemId,
        teacher_id: TeacherId,
        input: &ItemInput,
    ) -> Result<WishlistItem, RepositoryError> {
        sqlx::query_as::<_, WishlistItem>(&format!(
            r"
            WITH i AS (
                UPDATE wishlist_items
                SET name = $3, description = $4, quantity = $5, estimated_price = $6,
                    product_url = $7, priority = $8,
                    is_fulfilled = COALESCE($9, is_fulfilled), updated_at = NOW()
                WHERE id = $1 AND {OWNED_BY_TEACHER}
                RETURNING *
            )
            SELECT {ITEM_FIELDS} FROM i
            "
        ))
        .bind(id)
        .bind(teacher_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(input.estimated_price)
        .bind(&input.product_url)
        .bind(input.priority)
        .bind(input.is_fulfilled)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete an item on one of the teacher's wishlists.
    ///
    /// Returns the wishlist it belonged to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if nothing was deleted.
    pub async fn delete(
        &self,
        id: WishlistItemId,
        teacher_id: TeacherId,
    ) -> Result<WishlistId, RepositoryError> {
        sqlx::query_scalar::<_, WishlistId>(&format!(
            "DELETE FROM wishlist_items WHERE id = $1 AND {OWNED_BY_TEACHER} RETURNING wishlist_id"
        ))
        .bind(id)
        .bind(teacher_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Rewrite `sort_order` so items follow `order`.
    ///
    /// `order` must list every item on the wishlist exactly once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist is not the
    /// teacher's, or `RepositoryError::Conflict` if `order` does not match
    /// the wishlist's items. Nothing is written on error.
    pub async fn reorder(
        &self,
        wishlist_id: WishlistId,
        teacher_id: TeacherId,
        order: &[WishlistItemId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM wishlists WHERE id = $1 AND teacher_id = $2 FOR UPDATE")
                .bind(wishlist_id)
                .bind(teacher_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM wishlist_items WHERE wishlist_id = $1")
                .bind(wishlist_id)
                .fetch_one(&mut *tx)
                .await?;

        let ids: Vec<i32> = order.iter().map(|id| id.as_i32()).collect();
        let result = sqlx::query(
            r"
            UPDATE wishlist_items AS i
            SET sort_order = (o.ord - 1)::INTEGER, updated_at = NOW()
            FROM UNNEST($2::INTEGER[]) WITH ORDINALITY AS o(id, ord)
            WHERE i.id = o.id AND i.wishlist_id = $1
            ",
        )
        .bind(wishlist_id)
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        let expected = u64::try_from(existing).unwrap_or_default();
        if result.rows_affected() != expected || ids.len() as u64 != expected {
            return Err(RepositoryError::Conflict(
                "order must list every item on the wishlist once".to_owned(),
            ));
        }

        tx.commit().await?;

        Ok(())
    }
}
