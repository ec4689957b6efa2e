//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use wishlisted_core::{Email, UserId, UserRole};

/// A user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
