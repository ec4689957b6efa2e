//! Pledge lifecycle rules.
//!
//! A pledge moves `pending -> confirmed -> completed`, or from `pending` or
//! `confirmed` to `cancelled`. `completed` and `cancelled` are terminal. The
//! server applies these rules before every status write and repeats the
//! expected source state in the `UPDATE ... WHERE status = ...` guard, so a
//! stale client cannot move a pledge backwards.
//!
//! ```text
//!  pending --confirm--> confirmed --complete--> completed
//!     |                    |
//!     +------cancel--------+-----> cancelled
//! ```

use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{MAX_AMOUNT, MONEY_SCALE};

/// Status of a pledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "pledge_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PledgeStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// A donor-initiated step in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PledgeAction {
    /// "I've made the transfer."
    Confirm,
    /// "Mark as donated."
    Complete,
    /// Withdraw the pledge.
    Cancel,
}

impl std::fmt::Display for PledgeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Confirm => "confirm",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        })
    }
}

/// A lifecycle step that is not allowed from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} a {from} pledge")]
pub struct TransitionError {
    pub from: PledgeStatus,
    pub action: PledgeAction,
}

impl PledgeStatus {
    /// Compute the status after `action`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when `action` is not valid from `self`.
    pub const fn apply(self, action: PledgeAction) -> Result<Self, TransitionError> {
        match (self, action) {
            (Self::Pending, PledgeAction::Confirm) => Ok(Self::Confirmed),
            (Self::Confirmed, PledgeAction::Complete) => Ok(Self::Completed),
            (Self::Pending | Self::Confirmed, PledgeAction::Cancel) => Ok(Self::Cancelled),
            (from, action) => Err(TransitionError { from, action }),
        }
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The teacher's banking details may be shown to the pledging donor.
    #[must_use]
    pub const fn reveals_banking(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// The pledged quantity is subtracted from the item's remaining quantity.
    #[must_use]
    pub const fn counts_toward_item(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Lowercase label matching the database enum.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PledgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the donor intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cash,
    Other,
}

/// Prefix for generated transaction references.
pub const REFERENCE_PREFIX: &str = "WL-";

/// Number of random characters after the prefix.
pub const REFERENCE_LENGTH: usize = 10;

// No 0/O or 1/I so references survive being read over the phone.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a transaction reference such as `WL-7KQ2MZP4XD`.
///
/// Donors quote this on their bank transfer so teachers can match payments.
#[must_use]
pub fn transaction_reference() -> String {
    let mut rng = rand::rng();
    let mut reference = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_LENGTH);
    reference.push_str(REFERENCE_PREFIX);
    for _ in 0..REFERENCE_LENGTH {
        if let Some(&byte) = REFERENCE_ALPHABET.choose(&mut rng) {
            reference.push(char::from(byte));
        }
    }
    reference
}

/// Maximum length of a donor's message to the teacher.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Validation failures for pledge input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PledgeInputError {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount must have at most two decimal places")]
    TooPrecise,
    #[error("amount must be at most 9999999999.99")]
    AmountTooLarge,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("message must be at most {MAX_MESSAGE_LENGTH} characters")]
    MessageTooLong,
}

/// Donor input for a new pledge, before it touches the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPledge {
    pub amount: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewPledge {
    /// Check amount, quantity and message length. Amounts must fit a
    /// `NUMERIC(12, 2)` column.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), PledgeInputError> {
        if self.amount <= Decimal::ZERO {
            return Err(PledgeInputError::NonPositiveAmount);
        }
        if self.amount.normalize().scale() > MONEY_SCALE {
            return Err(PledgeInputError::TooPrecise);
        }
        if self.amount > MAX_AMOUNT {
            return Err(PledgeInputError::AmountTooLarge);
        }
        if self.quantity < 1 {
            return Err(PledgeInputError::ZeroQuantity);
        }
        validate_message(self.message.as_deref())
    }
}

/// Check an optional donor message.
///
/// # Errors
///
/// Returns `MessageTooLong` past [`MAX_MESSAGE_LENGTH`] characters.
pub fn validate_message(message: Option<&str>) -> Result<(), PledgeInputError> {
    match message {
        Some(m) if m.chars().count() > MAX_MESSAGE_LENGTH => Err(PledgeInputError::MessageTooLong),
        _ => Ok(()),
    }
}
