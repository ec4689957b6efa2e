//! Admin verification queue.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use wishlisted_core::{Capability, TeacherId};

use crate::error::Result;
use crate::middleware::{RequireAuth, require_capability};
use crate::models::{Teacher, TeacherReview};
use crate::services::VerificationService;
use crate::state::AppState;

/// Body for approve and reject. Both accept an empty body.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// `GET /api/admin/teachers`
pub async fn queue(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Teacher>>> {
    require_capability(&user, Capability::ReviewTeachers)?;
    Ok(Json(VerificationService::new(&state).queue().await?))
}

/// `POST /api/admin/teachers/{id}/approve`
pub async fn approve(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TeacherId>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<Teacher>> {
    require_capability(&user, Capability::ReviewTeachers)?;
    let Json(body) = body.unwrap_or_default();

    let teacher = VerificationService::new(&state)
        .approve(id, user.id, body.comment.as_deref())
        .await?;
    Ok(Json(teacher))
}

/// `POST /api/admin/teachers/{id}/reject`
///
/// The teacher profile is removed; the response is the review record.
pub async fn reject(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<TeacherId>,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<TeacherReview>> {
    require_capability(&user, Capability::ReviewTeachers)?;
    let Json(body) = body.unwrap_or_default();

    let review = VerificationService::new(&state)
        .reject(id, user.id, body.comment.as_deref())
        .await?;
    Ok(Json(review))
}
