//! Pledge models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use wishlisted_core::{
    DonorId, PaymentMethod, PledgeId, PledgeStatus, WishlistId, WishlistItemId,
};

/// A pledge row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pledge {
    pub id: PledgeId,
    pub item_id: Option<WishlistItemId>,
    pub donor_id: DonorId,
    pub amount: Decimal,
    pub quantity: i32,
    pub payment_method: PaymentMethod,
    pub status: PledgeStatus,
    pub transaction_reference: String,
    pub message: Option<String>,
    pub confirmation_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// A pledge joined with the item, wishlist and people around it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PledgeListing {
    pub id: PledgeId,
    pub item_id: Option<WishlistItemId>,
    pub item_name: Option<String>,
    pub wishlist_id: Option<WishlistId>,
    pub wishlist_title: Option<String>,
    pub teacher_name: Option<String>,
    pub donor_name: String,
    pub amount: Decimal,
    pub quantity: i32,
    pub payment_method: PaymentMethod,
    pub status: PledgeStatus,
    pub transaction_reference: String,
    pub message: Option<String>,
    pub confirmation_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Banking details disclosed to a donor with an open pledge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankingInfo {
    pub pledge_id: PledgeId,
    pub teacher_name: String,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub branch: Option<String>,
    pub amount: Decimal,
    pub transaction_reference: String,
}
