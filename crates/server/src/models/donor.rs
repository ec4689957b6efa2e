//! Donor profile model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use wishlisted_core::{DonorId, UserId};

/// A donor profile with running totals.
///
/// `total_pledged` covers pending and confirmed pledges; `total_donated`
/// covers completed ones. Both are updated in the same transaction as the
/// pledge status write.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: DonorId,
    pub user_id: UserId,
    pub display_name: String,
    pub phone: Option<String>,
    pub is_anonymous: bool,
    pub total_pledged: Decimal,
    pub total_donated: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
