//! Wishlist item routes. All require the teacher who owns the wishlist.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use wishlisted_core::validation::{self, MAX_LONG_TEXT, MAX_SHORT_TEXT, ValidationError};
use wishlisted_core::{ItemPriority, WishlistId, WishlistItemId};

use crate::db::items::ItemInput;
use crate::db::{ItemRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::WishlistItem;
use crate::realtime::WishlistChange;
use crate::routes::wishlists::{require_teacher, wishlist_changed};
use crate::state::AppState;

/// Item form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub estimated_price: Option<Decimal>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub priority: ItemPriority,
    /// Only honoured on update.
    #[serde(default)]
    pub is_fulfilled: Option<bool>,
}

impl ItemRequest {
    /// Trim, length-check and range-check.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> std::result::Result<ItemInput, ValidationError> {
        let estimated_price = match self.estimated_price {
            Some(price) if price < Decimal::ZERO => {
                return Err(ValidationError::NotPositive("estimated price"));
            }
            Some(price) => Some(validation::money("estimated price", price)?),
            None => None,
        };

        Ok(ItemInput {
            name: validation::required_text("name", &self.name, MAX_SHORT_TEXT)?,
            description: validation::optional_text(
                "description",
                self.description.as_deref(),
                MAX_LONG_TEXT,
            )?,
            quantity: validation::positive_quantity("quantity", self.quantity)?,
            estimated_price,
            product_url: validation::optional_link("product URL", self.product_url.as_deref())?,
            priority: self.priority,
            is_fulfilled: self.is_fulfilled,
        })
    }
}

/// New item order for a wishlist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub item_ids: Vec<WishlistItemId>,
}

/// `POST /api/wishlists/{id}/items`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(wishlist_id): Path<WishlistId>,
    Json(body): Json<ItemRequest>,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    let teacher = require_teacher(&state, &user).await?;
    let input = body.validate()?;

    WishlistRepository::new(state.pool())
        .get(wishlist_id)
        .await?
        .filter(|w| w.teacher_id == teacher.id)
        .ok_or_else(|| AppError::NotFound("Wishlist".to_string()))?;

    let item = ItemRepository::new(state.pool())
        .create(wishlist_id, &input)
        .await?;

    wishlist_changed(&state, wishlist_id, WishlistChange::ItemsChanged, Some(item.id)).await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /api/wishlists/{id}/items/reorder`
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(wishlist_id): Path<WishlistId>,
    Json(body): Json<ReorderRequest>,
) -> Result<Json<Vec<WishlistItem>>> {
    let teacher = require_teacher(&state, &user).await?;

    let items = ItemRepository::new(state.pool());
    items
        .reorder(wishlist_id, teacher.id, &body.item_ids)
        .await?;

    wishlist_changed(&state, wishlist_id, WishlistChange::ItemsChanged, None).await;

    Ok(Json(items.list_for_wishlist(wishlist_id).await?))
}

/// `PUT /api/items/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<WishlistItemId>,
    Json(body): Json<ItemRequest>,
) -> Result<Json<WishlistItem>> {
    let teacher = require_teacher(&state, &user).await?;
    let input = body.validate()?;

    let item = ItemRepository::new(state.pool())
        .update(id, teacher.id, &input)
        .await?;

    wishlist_changed(&state, item.wishlist_id, WishlistChange::ItemsChanged, Some(id)).await;

    Ok(Json(item))
}

/// `DELETE /api/items/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<WishlistItemId>,
) -> Result<StatusCode> {
    let teacher = require_teacher(&state, &user).await?;

    let wishlist_id = ItemRepository::new(state.pool())
        .delete(id, teacher.id)
        .await?;

    wishlist_changed(&state, wishlist_id, WishlistChange::ItemsChanged, Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}
