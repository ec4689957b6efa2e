//! Teacher and donor profile routes.
//!
//! Each user has at most one profile row; `PUT` creates it on first save.

use axum::{Json, extract::State};
use serde::Deserialize;

use wishlisted_core::validation::{self, MAX_LONG_TEXT, MAX_SHORT_TEXT, ValidationError};
use wishlisted_core::Capability;

use crate::db::donors::DonorProfileInput;
use crate::db::teachers::TeacherProfileInput;
use crate::db::{DonorRepository, TeacherRepository};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, require_capability};
use crate::models::{Donor, Teacher};
use crate::state::AppState;

/// Teacher profile form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfileRequest {
    pub full_name: String,
    pub school: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_holder: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub amazon_wishlist_url: Option<String>,
}

impl TeacherProfileRequest {
    /// Trim, length-check and normalise blanks to `None`.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> std::result::Result<TeacherProfileInput, ValidationError> {
        let short = |field: &'static str, value: Option<&str>| {
            validation::optional_text(field, value, MAX_SHORT_TEXT)
        };

        Ok(TeacherProfileInput {
            full_name: validation::required_text("full name", &self.full_name, MAX_SHORT_TEXT)?,
            school: validation::required_text("school", &self.school, MAX_SHORT_TEXT)?,
            grade: short("grade", self.grade.as_deref())?,
            location: short("location", self.location.as_deref())?,
            bio: validation::optional_text("bio", self.bio.as_deref(), MAX_LONG_TEXT)?,
            bank_name: short("bank name", self.bank_name.as_deref())?,
            account_holder: short("account holder", self.account_holder.as_deref())?,
            account_number: short("account number", self.account_number.as_deref())?,
            branch: short("branch", self.branch.as_deref())?,
            amazon_wishlist_url: validation::optional_link(
                "Amazon wishlist URL",
                self.amazon_wishlist_url.as_deref(),
            )?,
        })
    }
}

/// Donor profile form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl DonorProfileRequest {
    /// Trim and length-check.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> std::result::Result<DonorProfileInput, ValidationError> {
        Ok(DonorProfileInput {
            display_name: validation::required_text(
                "display name",
                &self.display_name,
                MAX_SHORT_TEXT,
            )?,
            phone: validation::optional_text("phone", self.phone.as_deref(), 40)?,
            is_anonymous: self.is_anonymous,
        })
    }
}

/// The signed-in teacher's profile, banking details included.
pub async fn get_teacher_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Teacher>> {
    require_capability(&user, Capability::ManageTeacherProfile)?;

    let teacher = TeacherRepository::new(state.pool())
        .get_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher profile".to_string()))?;

    Ok(Json(teacher))
}

/// Create or update the signed-in teacher's profile.
pub async fn put_teacher_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<TeacherProfileRequest>,
) -> Result<Json<Teacher>> {
    require_capability(&user, Capability::ManageTeacherProfile)?;
    let input = body.validate()?;

    let teacher = TeacherRepository::new(state.pool())
        .upsert(user.id, &input)
        .await?;
    tracing::info!(teacher_id = %teacher.id, complete = teacher.is_verified, "Teacher profile saved");

    state.recent().invalidate().await;

    Ok(Json(teacher))
}

/// The signed-in donor's profile and totals.
pub async fn get_donor_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Donor>> {
    require_capability(&user, Capability::ManageDonorProfile)?;

    let donor = DonorRepository::new(state.pool())
        .get_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Donor profile".to_string()))?;

    Ok(Json(donor))
}

/// Create or update the signed-in donor's profile.
pub async fn put_donor_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<DonorProfileRequest>,
) -> Result<Json<Donor>> {
    require_capability(&user, Capability::ManageDonorProfile)?;
    let input = body.validate()?;

    let donor = DonorRepository::new(state.pool())
        .upsert(user.id, &input)
        .await?;

    Ok(Json(donor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn teacher_request() -> TeacherProfileRequest {
        serde_json::from_str(
            r#"{
                "fullName": "  Ms. Kendra Rolle ",
                "school": "Sandilands Primary",
                "grade": "",
                "location": "Nassau",
                "bankName": "Bank of The Bahamas",
                "accountHolder": "K. Rolle",
                "accountNumber": "00123456"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_teacher_profile_normalises() {
        let input = teacher_request().validate().unwrap();
        assert_eq!(input.full_name, "Ms. Kendra Rolle");
        assert_eq!(input.grade, None);
        assert!(input.is_complete());
    }

    #[test]
    fn test_teacher_profile_without_banking_is_incomplete() {
        let mut request = teacher_request();
        request.account_number = Some("  ".to_string());
        assert!(!request.validate().unwrap().is_complete());
    }

    #[test]
    fn test_teacher_profile_requires_school() {
        let mut request = teacher_request();
        request.school = " ".to_string();
        assert_eq!(
            request.validate().unwrap_err(),
            ValidationError::Required("school")
        );
    }

    #[test]
    fn test_teacher_profile_rejects_bad_link() {
        let mut request = teacher_request();
        request.amazon_wishlist_url = Some("amazon.com/list".to_string());
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_donor_profile_defaults() {
        let request: DonorProfileRequest =
            serde_json::from_str(r#"{"displayName":" Island Rotary "}"#).unwrap();
        let input = request.validate().unwrap();
        assert_eq!(input.display_name, "Island Rotary");
        assert!(!input.is_anonymous);
        assert_eq!(input.phone, None);
    }
}
