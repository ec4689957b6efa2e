//! Teacher profile models.
//!
//! Banking fields are only ever serialized to the teacher who owns them or,
//! through [`super::BankingInfo`], to a donor with an open pledge.

use chrono::{DateTime, Utc};
use serde::Serialize;

use wishlisted_core::{TeacherId, UserId};

/// A teacher profile, including private banking details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub user_id: UserId,
    pub full_name: String,
    pub school: String,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_teacher_verified: bool,
    pub verification_comment: Option<String>,
    pub bank_name: Option<String>,
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub branch: Option<String>,
    pub amazon_wishlist_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Teacher {
    /// Enough banking detail for a donor to make a transfer.
    #[must_use]
    pub fn has_banking(&self) -> bool {
        [&self.bank_name, &self.account_holder, &self.account_number]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// The fields anyone may see.
    #[must_use]
    pub fn public(&self) -> PublicTeacher {
        PublicTeacher {
            id: self.id,
            full_name: self.full_name.clone(),
            school: self.school.clone(),
            grade: self.grade.clone(),
            location: self.location.clone(),
            bio: self.bio.clone(),
            is_teacher_verified: self.is_teacher_verified,
            amazon_wishlist_url: self.amazon_wishlist_url.clone(),
        }
    }
}

/// Teacher details shown on public wishlist pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTeacher {
    pub id: TeacherId,
    pub full_name: String,
    pub school: String,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub is_teacher_verified: bool,
    pub amazon_wishlist_url: Option<String>,
}

/// One admin decision on a teacher.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeacherReview {
    pub id: i32,
    pub teacher_user_id: UserId,
    pub reviewer_id: Option<UserId>,
    pub approved: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
