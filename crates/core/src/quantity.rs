//! Remaining-quantity arithmetic and the over-commit policy.
//!
//! An item's remaining quantity is its requested quantity minus every
//! non-cancelled pledge against it. The server evaluates [`check_pledge`]
//! while holding a row lock on the item, so two donors racing for the last
//! unit cannot both succeed.

use thiserror::Error;

/// Why a pledge quantity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The item is already marked fulfilled.
    #[error("this item has already been fulfilled")]
    AlreadyFulfilled,
    /// The pledge asks for more than is still needed.
    #[error("only {remaining} remaining, cannot pledge {requested}")]
    OverCommit { requested: i32, remaining: i32 },
}

/// Units still needed. Never negative, even if past pledges over-committed.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // bounded by the branches above the cast
pub const fn remaining(quantity_needed: i32, pledged: i64) -> i32 {
    let left = quantity_needed as i64 - pledged;
    if left <= 0 {
        0
    } else if left > i32::MAX as i64 {
        i32::MAX
    } else {
        left as i32
    }
}

/// Every requested unit has been pledged.
#[must_use]
pub const fn is_fully_pledged(quantity_needed: i32, pledged: i64) -> bool {
    remaining(quantity_needed, pledged) == 0
}

/// Decide whether a new pledge of `requested` units may be accepted.
///
/// # Errors
///
/// Returns `AlreadyFulfilled` for fulfilled items and `OverCommit` when
/// `requested` exceeds what is still needed.
pub const fn check_pledge(
    quantity_needed: i32,
    pledged: i64,
    fulfilled: bool,
    requested: i32,
) -> Result<i32, QuantityError> {
    if fulfilled {
        return Err(QuantityError::AlreadyFulfilled);
    }
    let left = remaining(quantity_needed, pledged);
    if requested > left {
        return Err(QuantityError::OverCommit {
            requested,
            remaining: left,
        });
    }
    Ok(left - requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_basic() {
        assert_eq!(remaining(3, 0), 3);
        assert_eq!(remaining(3, 2), 1);
        assert_eq!(remaining(3, 3), 0);
    }

    #[test]
    fn test_remaining_clamps_over_commit() {
        assert_eq!(remaining(3, 5), 0);
        assert!(is_fully_pledged(3, 5));
    }

    #[test]
    fn test_check_pledge_accepts_within_remaining() {
        assert_eq!(check_pledge(3, 0, false, 2), Ok(1));
        assert_eq!(check_pledge(3, 1, false, 2), Ok(0));
    }

    #[test]
    fn test_check_pledge_rejects_over_commit() {
        assert_eq!(
            check_pledge(3, 2, false, 2),
            Err(QuantityError::OverCommit {
                requested: 2,
                remaining: 1
            })
        );
    }

    #[test]
    fn test_check_pledge_rejects_fulfilled() {
        assert_eq!(
            check_pledge(3, 0, true, 1),
            Err(QuantityError::AlreadyFulfilled)
        );
    }
}
