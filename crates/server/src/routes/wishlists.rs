//! Wishlist routes: public browse and recent feed, teacher CRUD.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use wishlisted_core::validation::{self, MAX_LONG_TEXT, MAX_SHORT_TEXT, ValidationError};
use wishlisted_core::{BrowseFilter, Capability, ShareToken, WishlistId};

use crate::db::wishlists::WishlistInput;
use crate::db::{ItemRepository, TeacherRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, require_capability};
use crate::models::{
    CurrentUser, RecentWishlist, Teacher, Wishlist, WishlistItem, WishlistSummary,
};
use crate::realtime::{RealtimeEvent, WishlistChange};
use crate::state::AppState;

/// Wishlist form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl WishlistRequest {
    /// Trim and length-check.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> std::result::Result<WishlistInput, ValidationError> {
        Ok(WishlistInput {
            title: validation::required_text("title", &self.title, MAX_SHORT_TEXT)?,
            description: validation::optional_text(
                "description",
                self.description.as_deref(),
                MAX_LONG_TEXT,
            )?,
            is_active: self.is_active,
        })
    }
}

/// A wishlist with its items and public link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistDetail {
    #[serde(flatten)]
    pub wishlist: Wishlist,
    pub share_url: String,
    pub items: Vec<WishlistItem>,
}

/// Absolute public link for a share token.
pub(crate) fn share_url(state: &AppState, share_token: &str) -> String {
    state
        .config()
        .absolute_url(&format!("/wishlist/{share_token}"))
}

/// Resolve the signed-in teacher's profile.
///
/// Wishlists hang off the profile, so one must exist first.
pub(crate) async fn require_teacher(state: &AppState, user: &CurrentUser) -> Result<Teacher> {
    require_capability(user, Capability::ManageWishlists)?;

    TeacherRepository::new(state.pool())
        .get_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Create your teacher profile first".to_string()))
}

/// Announce a wishlist change and drop the landing page cache.
pub(crate) async fn wishlist_changed(
    state: &AppState,
    wishlist_id: WishlistId,
    change: WishlistChange,
    item_id: Option<wishlisted_core::WishlistItemId>,
) {
    state.recent().invalidate().await;
    state
        .realtime()
        .publish(RealtimeEvent::wishlist_changed(wishlist_id, change, item_id));
}

/// `GET /api/wishlists`: active wishlists filtered by `?q=&location=&grade=&verified=`.
pub async fn browse(
    State(state): State<AppState>,
    Query(filter): Query<BrowseFilter>,
) -> Result<Json<Vec<WishlistSummary>>> {
    let rows = WishlistRepository::new(state.pool()).browse().await?;
    Ok(Json(filter.apply(rows)))
}

/// `GET /api/wishlists/recent`: landing page feed, cached.
pub async fn recent(State(state): State<AppState>) -> Result<Json<Vec<RecentWishlist>>> {
    let limit = state.config().recent_limit;

    if let Some(rows) = state.recent().get(limit).await {
        return Ok(Json(rows.as_ref().clone()));
    }

    let rows: Vec<RecentWishlist> = WishlistRepository::new(state.pool())
        .recent(limit)
        .await?
        .into_iter()
        .map(|row| {
            let url = share_url(&state, &row.share_token);
            RecentWishlist::from_summary(row, url)
        })
        .collect();

    state
        .recent()
        .insert(limit, std::sync::Arc::new(rows.clone()))
        .await;

    Ok(Json(rows))
}

/// `GET /api/wishlists/mine`: the teacher's wishlists with items.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistDetail>>> {
    let teacher = require_teacher(&state, &user).await?;

    let wishlists = WishlistRepository::new(state.pool())
        .list_for_teacher(teacher.id)
        .await?;

    let items = ItemRepository::new(state.pool());
    let mut details = Vec::with_capacity(wishlists.len());
    for wishlist in wishlists {
        let list_items = items.list_for_wishlist(wishlist.id).await?;
        details.push(WishlistDetail {
            share_url: share_url(&state, &wishlist.share_token),
            wishlist,
            items: list_items,
        });
    }

    Ok(Json(details))
}

/// `POST /api/wishlists`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<WishlistRequest>,
) -> Result<(StatusCode, Json<WishlistDetail>)> {
    let teacher = require_teacher(&state, &user).await?;
    let input = body.validate()?;

    let wishlist = WishlistRepository::new(state.pool())
        .create(teacher.id, &input)
        .await?;
    tracing::info!(wishlist_id = %wishlist.id, teacher_id = %teacher.id, "Wishlist created");

    wishlist_changed(&state, wishlist.id, WishlistChange::Created, None).await;

    Ok((
        StatusCode::CREATED,
        Json(WishlistDetail {
            share_url: share_url(&state, &wishlist.share_token),
            wishlist,
            items: Vec::new(),
        }),
    ))
}

/// `PUT /api/wishlists/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<WishlistId>,
    Json(body): Json<WishlistRequest>,
) -> Result<Json<Wishlist>> {
    let teacher = require_teacher(&state, &user).await?;
    let input = body.validate()?;

    let wishlist = WishlistRepository::new(state.pool())
        .update(id, teacher.id, &input)
        .await?;

    wishlist_changed(&state, id, WishlistChange::Updated, None).await;

    Ok(Json(wishlist))
}

/// `DELETE /api/wishlists/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<WishlistId>,
) -> Result<StatusCode> {
    let teacher = require_teacher(&state, &user).await?;

    WishlistRepository::new(state.pool())
        .delete(id, teacher.id)
        .await?;
    tracing::info!(wishlist_id = %id, "Wishlist deleted");

    wishlist_changed(&state, id, WishlistChange::Deleted, None).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Parse a share token from a URL. Malformed tokens are plain 404s.
pub(crate) fn parse_share_token(raw: &str) -> Result<ShareToken> {
    ShareToken::parse(raw).map_err(|_| AppError::NotFound("Wishlist".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wishlist_request_defaults_active() {
        let body: WishlistRequest = serde_json::from_str(r#"{"title":"Science corner"}"#).unwrap();
        let input = body.validate().unwrap();
        assert!(input.is_active);
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_wishlist_request_requires_title() {
        let body: WishlistRequest =
            serde_json::from_str(r#"{"title":"  ","isActive":false}"#).unwrap();
        assert_eq!(
            body.validate().unwrap_err(),
            ValidationError::Required("title")
        );
    }

    #[test]
    fn test_parse_share_token_maps_to_not_found() {
        assert!(matches!(
            parse_share_token("short"),
            Err(AppError::NotFound(_))
        ));
        let token = ShareToken::generate();
        assert_eq!(parse_share_token(token.as_str()).unwrap(), token);
    }
}
