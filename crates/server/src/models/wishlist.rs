//! Wishlist and item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use wishlisted_core::quantity;
use wishlisted_core::{ItemPriority, Listing, TeacherId, WishlistId, WishlistItemId};

/// A teacher's wishlist.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: WishlistId,
    pub teacher_id: TeacherId,
    pub title: String,
    pub description: Option<String>,
    pub share_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item on a wishlist, with the quantity already pledged.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub wishlist_id: WishlistId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub estimated_price: Option<Decimal>,
    pub product_url: Option<String>,
    pub priority: ItemPriority,
    pub is_fulfilled: bool,
    pub sort_order: i32,
    /// Sum of non-cancelled pledge quantities.
    pub pledged_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Units still needed.
    #[must_use]
    pub const fn remaining(&self) -> i32 {
        quantity::remaining(self.quantity, self.pledged_quantity)
    }
}

impl Serialize for WishlistItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("WishlistItem", 14)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("wishlistId", &self.wishlist_id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("description", &self.description)?;
        s.serialize_field("quantity", &self.quantity)?;
        s.serialize_field("pledgedQuantity", &self.pledged_quantity)?;
        s.serialize_field("remaining", &self.remaining())?;
        s.serialize_field(
            "fullyPledged",
            &quantity::is_fully_pledged(self.quantity, self.pledged_quantity),
        )?;
        s.serialize_field("estimatedPrice", &self.estimated_price)?;
        s.serialize_field("productUrl", &self.product_url)?;
        s.serialize_field("priority", &self.priority)?;
        s.serialize_field("isFulfilled", &self.is_fulfilled)?;
        s.serialize_field("sortOrder", &self.sort_order)?;
        s.serialize_field("createdAt", &self.created_at)?;
        s.end()
    }
}

/// Browse-page row: a wishlist with its teacher and pledge progress.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSummary {
    pub id: WishlistId,
    pub title: String,
    pub description: Option<String>,
    pub share_token: String,
    pub teacher_name: String,
    pub school: String,
    pub location: Option<String>,
    pub grade: Option<String>,
    pub teacher_verified: bool,
    pub item_count: i64,
    pub quantity_needed: i64,
    pub quantity_pledged: i64,
    pub created_at: DateTime<Utc>,
}

impl Listing for WishlistSummary {
    fn title(&self) -> &str {
        &self.title
    }

    fn teacher_name(&self) -> &str {
        &self.teacher_name
    }

    fn school(&self) -> &str {
        &self.school
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    fn teacher_verified(&self) -> bool {
        self.teacher_verified
    }
}

/// Landing-page feed entry returned by `GET /api/wishlists/recent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentWishlist {
    pub id: WishlistId,
    pub title: String,
    pub description: Option<String>,
    pub teacher_name: String,
    pub school: String,
    pub location: Option<String>,
    pub item_count: i64,
    pub share_url: String,
    pub created_at: DateTime<Utc>,
}

impl RecentWishlist {
    /// Reshape a summary row, attaching its absolute share link.
    #[must_use]
    pub fn from_summary(row: WishlistSummary, share_url: String) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            teacher_name: row.teacher_name,
            school: row.school,
            location: row.location,
            item_count: row.item_count,
            share_url,
            created_at: row.created_at,
        }
    }
}
