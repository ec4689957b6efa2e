//! Public capability view: `GET /wishlist/{share_token}`.
//!
//! Anyone holding the link can read the wishlist, its items and the
//! teacher's public details. Banking fields are never included.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::Serialize;

use crate::db::{ItemRepository, TeacherRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::models::{PublicTeacher, WishlistItem};
use crate::routes::wishlists::parse_share_token;
use crate::state::AppState;

/// What a share link shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWishlist {
    pub id: wishlisted_core::WishlistId,
    pub title: String,
    pub description: Option<String>,
    pub teacher: PublicTeacher,
    pub items: Vec<WishlistItem>,
    pub quantity_needed: i64,
    pub quantity_pledged: i64,
}

/// Resolve a share token. Unknown, malformed and inactive lists all 404.
pub async fn show(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let not_found = || AppError::NotFound("Wishlist".to_string());
    let token = parse_share_token(&token)?;

    let wishlist = WishlistRepository::new(state.pool())
        .get_by_share_token(&token)
        .await?
        .filter(|w| w.is_active)
        .ok_or_else(not_found)?;

    let teacher = TeacherRepository::new(state.pool())
        .get(wishlist.teacher_id)
        .await?
        .ok_or_else(not_found)?;

    let items = ItemRepository::new(state.pool())
        .list_for_wishlist(wishlist.id)
        .await?;

    let quantity_needed = items.iter().map(|i| i64::from(i.quantity)).sum();
    let quantity_pledged = items.iter().map(|i| i.pledged_quantity).sum();

    let body = SharedWishlist {
        id: wishlist.id,
        title: wishlist.title,
        description: wishlist.description,
        teacher: teacher.public(),
        items,
        quantity_needed,
        quantity_pledged,
    };

    // Share links are unguessable; keep them out of search engines.
    Ok(([(header::HeaderName::from_static("x-robots-tag"), "noindex")], Json(body)))
}
