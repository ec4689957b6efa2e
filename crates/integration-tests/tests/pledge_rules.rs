//! Pledge rules exercised across crate boundaries: the quantity policy and
//! lifecycle from `wishlisted-core` together with the donor total deltas the
//! server applies on each step.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use wishlisted_core::quantity::{self, QuantityError};
use wishlisted_core::{PledgeAction, PledgeStatus, ShareToken};
use wishlisted_server::db::donors::TotalsDelta;
use wishlisted_server::services::pledges::totals_delta;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Totals {
    pledged: Decimal,
    donated: Decimal,
}

impl Totals {
    fn apply(&mut self, delta: TotalsDelta) {
        self.pledged += delta.pledged;
        self.donated += delta.donated;
    }
}

#[test]
fn test_two_of_three_then_donated() {
    let amount = Decimal::new(3000, 2);
    let mut totals = Totals::default();

    let left = quantity::check_pledge(3, 0, false, 2).unwrap();
    assert_eq!(left, 1);
    totals.pledged += amount;

    let status = PledgeStatus::default();
    let status = status.apply(PledgeAction::Confirm).unwrap();
    totals.apply(totals_delta(PledgeAction::Confirm, amount));
    assert_eq!(totals.pledged, amount);
    assert_eq!(totals.donated, Decimal::ZERO);

    let status = status.apply(PledgeAction::Complete).unwrap();
    totals.apply(totals_delta(PledgeAction::Complete, amount));
    assert_eq!(status, PledgeStatus::Completed);
    assert_eq!(totals.pledged, Decimal::ZERO);
    assert_eq!(totals.donated, amount);
}

#[test]
fn test_cancel_releases_quantity_and_pledged_total() {
    let amount = Decimal::new(1500, 2);
    let mut totals = Totals {
        pledged: amount,
        donated: Decimal::ZERO,
    };

    // Two units held by an open pledge: the last unit is all that is left.
    assert_eq!(
        quantity::check_pledge(3, 2, false, 2),
        Err(QuantityError::OverCommit {
            requested: 2,
            remaining: 1
        })
    );

    let status = PledgeStatus::Pending.apply(PledgeAction::Cancel).unwrap();
    assert!(!status.counts_toward_item());
    totals.apply(totals_delta(PledgeAction::Cancel, amount));
    assert_eq!(totals, Totals::default());

    // With the cancelled pledge no longer counted, two units fit again.
    assert_eq!(quantity::check_pledge(3, 0, false, 2), Ok(1));
}

#[test]
fn test_fulfilled_item_refuses_pledges() {
    assert_eq!(
        quantity::check_pledge(5, 0, true, 1),
        Err(QuantityError::AlreadyFulfilled)
    );
}

#[test]
fn test_no_sequence_of_actions_moves_backwards() {
    let actions = [
        PledgeAction::Confirm,
        PledgeAction::Complete,
        PledgeAction::Cancel,
    ];

    // Every path of up to three actions ends terminal or still open, and
    // nothing ever returns to pending.
    for a in actions {
        for b in actions {
            for c in actions {
                let mut status = PledgeStatus::Pending;
                for action in [a, b, c] {
                    if let Ok(next) = status.apply(action) {
                        assert_ne!(next, PledgeStatus::Pending);
                        status = next;
                    }
                }
                if status.is_terminal() {
                    for action in actions {
                        assert!(status.apply(action).is_err());
                    }
                }
            }
        }
    }
}

#[test]
fn test_share_tokens_do_not_repeat() {
    let tokens: std::collections::HashSet<String> = (0..1_000)
        .map(|_| ShareToken::generate().as_str().to_owned())
        .collect();
    assert_eq!(tokens.len(), 1_000);

    for token in &tokens {
        assert!(ShareToken::parse(token).is_ok());
    }
}
