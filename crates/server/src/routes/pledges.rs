//! Pledge routes. Donors create and move their own pledges; teachers can
//! list pledges against their items.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use wishlisted_core::{Capability, NewPledge, PledgeId, WishlistItemId};

use crate::error::Result;
use crate::middleware::{RequireAuth, require_capability};
use crate::models::{BankingInfo, Pledge, PledgeListing};
use crate::services::PledgeService;
use crate::state::AppState;

/// `POST /api/pledges` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePledgeRequest {
    pub item_id: WishlistItemId,
    #[serde(flatten)]
    pub pledge: NewPledge,
}

/// `POST /api/pledges/{id}/confirm` body.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/pledges`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreatePledgeRequest>,
) -> Result<(StatusCode, Json<PledgeListing>)> {
    require_capability(&user, Capability::Pledge)?;

    let listing = PledgeService::new(&state)
        .create(user.id, body.item_id, &body.pledge)
        .await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

/// `GET /api/pledges`: a donor's own pledges or a teacher's incoming ones.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<PledgeListing>>> {
    if !user.can(Capability::Pledge) {
        require_capability(&user, Capability::ViewIncomingPledges)?;
    }

    Ok(Json(PledgeService::new(&state).list_for(&user).await?))
}

/// `GET /api/pledges/{id}/banking`
pub async fn banking(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PledgeId>,
) -> Result<Json<BankingInfo>> {
    require_capability(&user, Capability::Pledge)?;

    let info = PledgeService::new(&state).banking_info(user.id, id).await?;
    Ok(Json(info))
}

/// `POST /api/pledges/{id}/confirm`
pub async fn confirm(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PledgeId>,
    body: Option<Json<ConfirmRequest>>,
) -> Result<Json<Pledge>> {
    require_capability(&user, Capability::Pledge)?;
    let Json(body) = body.unwrap_or_default();

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let pledge = PledgeService::new(&state)
        .confirm(user.id, id, message)
        .await?;
    Ok(Json(pledge))
}

/// `POST /api/pledges/{id}/complete`
pub async fn complete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PledgeId>,
) -> Result<Json<Pledge>> {
    require_capability(&user, Capability::Pledge)?;

    let pledge = PledgeService::new(&state).complete(user.id, id).await?;
    Ok(Json(pledge))
}

/// `POST /api/pledges/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<PledgeId>,
) -> Result<Json<Pledge>> {
    require_capability(&user, Capability::Pledge)?;

    let pledge = PledgeService::new(&state).cancel(user.id, id).await?;
    Ok(Json(pledge))
}
