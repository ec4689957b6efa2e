//! Pledge workflow.
//!
//! Every write runs in one transaction: the item or pledge row is locked,
//! the lifecycle and quantity rules from `wishlisted_core` are checked, the
//! status is written behind a `status = $from` guard and the donor's totals
//! move with it. Realtime events and recent-feed invalidation happen only
//! after commit.

use rust_decimal::Decimal;
use thiserror::Error;

use wishlisted_core::pledge::{self, transaction_reference};
use wishlisted_core::quantity::{self, QuantityError};
use wishlisted_core::{
    NewPledge, PledgeAction, PledgeId, PledgeInputError, TransitionError, UserId, UserRole,
    WishlistItemId,
};

use crate::db::donors::TotalsDelta;
use crate::db::{DonorRepository, PledgeRepository, RepositoryError, TeacherRepository};
use crate::models::{BankingInfo, CurrentUser, Donor, Pledge, PledgeListing};
use crate::realtime::{self, RealtimeEvent, WishlistChange};
use crate::state::AppState;

/// Errors from the pledge workflow.
#[derive(Debug, Error)]
pub enum PledgeError {
    #[error("{0}")]
    Input(#[from] PledgeInputError),

    #[error("{0}")]
    Quantity(#[from] QuantityError),

    #[error("{0}")]
    Transition(#[from] TransitionError),

    #[error("create a donor profile before pledging")]
    NoDonorProfile,

    #[error("pledge not found")]
    NotFound,

    #[error("item not found")]
    ItemNotFound,

    #[error("this wishlist is not accepting pledges")]
    WishlistInactive,

    #[error("banking details are not available for this pledge")]
    BankingUnavailable,

    #[error("pledge was changed by another request, reload and try again")]
    Stale,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Pledge workflow service.
pub struct PledgeService<'a> {
    state: &'a AppState,
}

impl<'a> PledgeService<'a> {
    /// Create a new pledge service.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn pledges(&self) -> PledgeRepository<'a> {
        PledgeRepository::new(self.state.pool())
    }

    async fn donor_for(&self, user_id: UserId) -> Result<Donor, PledgeError> {
        DonorRepository::new(self.state.pool())
            .get_by_user(user_id)
            .await?
            .ok_or(PledgeError::NoDonorProfile)
    }

    /// Place a pending pledge against an item.
    ///
    /// # Errors
    ///
    /// Returns `PledgeError::Input` for invalid amounts or quantities,
    /// `PledgeError::NoDonorProfile` if the donor has not set up a profile,
    /// `PledgeError::Quantity` if the item is fulfilled or the quantity
    /// exceeds what is still needed.
    pub async fn create(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
        input: &NewPledge,
    ) -> Result<PledgeListing, PledgeError> {
        input.validate()?;
        let donor = self.donor_for(user_id).await?;

        let mut tx = self.state.pool().begin().await.map_err(RepositoryError::from)?;

        let item = PledgeRepository::lock_item(&mut *tx, item_id)
            .await?
            .ok_or(PledgeError::ItemNotFound)?;
        if !item.is_active {
            return Err(PledgeError::WishlistInactive);
        }

        let pledged = PledgeRepository::pledged_quantity(&mut *tx, item_id).await?;
        let left_after =
            quantity::check_pledge(item.quantity, pledged, item.is_fulfilled, input.quantity)?;

        let reference = transaction_reference();
        let pledge = PledgeRepository::insert(&mut *tx, donor.id, item_id, input, &reference).await?;

        DonorRepository::apply_totals(
            &mut *tx,
            donor.id,
            TotalsDelta {
                pledged: pledge.amount,
                donated: Decimal::ZERO,
            },
        )
        .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            pledge_id = %pledge.id,
            donor_id = %donor.id,
            item_id = %item_id,
            quantity = pledge.quantity,
            remaining = left_after,
            "Pledge created"
        );

        let listing = self
            .pledges()
            .get_listing(pledge.id)
            .await?
            .ok_or(PledgeError::NotFound)?;

        let hub = self.state.realtime();
        hub.publish(RealtimeEvent::pledge_created(&listing));
        hub.publish(RealtimeEvent::wishlist_changed(
            item.wishlist_id,
            WishlistChange::ItemsChanged,
            Some(item_id),
        ));
        self.state.recent().invalidate().await;

        Ok(listing)
    }

    /// Donor reports the transfer as made.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn confirm(
        &self,
        user_id: UserId,
        id: PledgeId,
        message: Option<&str>,
    ) -> Result<Pledge, PledgeError> {
        pledge::validate_message(message)?;
        self.transition(user_id, id, PledgeAction::Confirm, message)
            .await
    }

    /// Donor marks a confirmed pledge as donated.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn complete(&self, user_id: UserId, id: PledgeId) -> Result<Pledge, PledgeError> {
        self.transition(user_id, id, PledgeAction::Complete, None)
            .await
    }

    /// Donor withdraws an open pledge.
    ///
    /// # Errors
    ///
    /// See [`Self::transition`].
    pub async fn cancel(&self, user_id: UserId, id: PledgeId) -> Result<Pledge, PledgeError> {
        self.transition(user_id, id, PledgeAction::Cancel, None)
            .await
    }

    /// Apply one lifecycle step to a donor's own pledge.
    ///
    /// # Errors
    ///
    /// Returns `PledgeError::NotFound` if the pledge does not exist or
    /// belongs to someone else, `PledgeError::Transition` if the step is not
    /// allowed from the current status and `PledgeError::Stale` if the row
    /// changed between the lock and the guarded update.
    pub async fn transition(
        &self,
        user_id: UserId,
        id: PledgeId,
        action: PledgeAction,
        message: Option<&str>,
    ) -> Result<Pledge, PledgeError> {
        let donor = self.donor_for(user_id).await?;

        let mut tx = self.state.pool().begin().await.map_err(RepositoryError::from)?;

        let current = PledgeRepository::lock(&mut *tx, id)
            .await?
            .filter(|p| p.donor_id == donor.id)
            .ok_or(PledgeError::NotFound)?;

        let next = current.status.apply(action)?;

        let updated =
            PledgeRepository::transition(&mut *tx, id, donor.id, current.status, next, message)
                .await
                .map_err(|e| match e {
                    RepositoryError::StaleState => PledgeError::Stale,
                    other => PledgeError::Repository(other),
                })?;

        DonorRepository::apply_totals(&mut *tx, donor.id, totals_delta(action, updated.amount))
            .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            pledge_id = %id,
            from = %current.status,
            to = %updated.status,
            "Pledge status changed"
        );

        self.publish_status(&updated).await;
        self.state.recent().invalidate().await;

        Ok(updated)
    }

    async fn publish_status(&self, pledge: &Pledge) {
        let listing = match self.pledges().get_listing(pledge.id).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!(error = %e, pledge_id = %pledge.id, "Could not load pledge for event");
                None
            }
        };

        let wishlist_id = listing.as_ref().and_then(|l| l.wishlist_id);
        let hub = self.state.realtime();
        hub.publish(RealtimeEvent::pledge_status(pledge, wishlist_id));

        if let Some(wishlist_id) = wishlist_id {
            hub.publish(RealtimeEvent::wishlist_changed(
                wishlist_id,
                WishlistChange::ItemsChanged,
                pledge.item_id,
            ));
        }

        if realtime::is_public_milestone(pledge.status) {
            if let Some(listing) = listing {
                hub.publish(RealtimeEvent {
                    kind: realtime::EventKind::ActivityUpdate,
                    data: serde_json::json!({
                        "action": "pledge_completed",
                        "pledgeId": listing.id,
                        "donorName": listing.donor_name,
                        "itemName": listing.item_name,
                        "wishlistId": listing.wishlist_id,
                        "wishlistTitle": listing.wishlist_title,
                        "teacherName": listing.teacher_name,
                        "quantity": listing.quantity,
                    }),
                });
            }
        }
    }

    /// The teacher's banking details for a donor's open pledge.
    ///
    /// # Errors
    ///
    /// Returns `PledgeError::NotFound` if the pledge is not the donor's and
    /// `PledgeError::BankingUnavailable` once it is completed or cancelled,
    /// or when the teacher has not entered banking details.
    pub async fn banking_info(
        &self,
        user_id: UserId,
        id: PledgeId,
    ) -> Result<BankingInfo, PledgeError> {
        let donor = self.donor_for(user_id).await?;

        let pledge = self
            .pledges()
            .get(id)
            .await?
            .filter(|p| p.donor_id == donor.id)
            .ok_or(PledgeError::NotFound)?;

        if !pledge.status.reveals_banking() {
            return Err(PledgeError::BankingUnavailable);
        }

        let teacher_id = self
            .pledges()
            .teacher_for(id)
            .await?
            .ok_or(PledgeError::BankingUnavailable)?;
        let teacher = TeacherRepository::new(self.state.pool())
            .banking_for(teacher_id)
            .await?
            .ok_or(PledgeError::BankingUnavailable)?;

        let (Some(bank_name), Some(account_holder), Some(account_number)) = (
            teacher.bank_name,
            teacher.account_holder,
            teacher.account_number,
        ) else {
            return Err(PledgeError::BankingUnavailable);
        };

        Ok(BankingInfo {
            pledge_id: pledge.id,
            teacher_name: teacher.full_name,
            bank_name,
            account_holder,
            account_number,
            branch: teacher.branch,
            amount: pledge.amount,
            transaction_reference: pledge.transaction_reference,
        })
    }

    /// Pledges visible to a user: a donor's own, or those against a
    /// teacher's items. Admins and users without a profile see none.
    ///
    /// # Errors
    ///
    /// Returns `PledgeError::Repository` if a query fails.
    pub async fn list_for(&self, user: &CurrentUser) -> Result<Vec<PledgeListing>, PledgeError> {
        let pool = self.state.pool();
        match user.role {
            UserRole::Donor => match DonorRepository::new(pool).get_by_user(user.id).await? {
                Some(donor) => Ok(self.pledges().list_for_donor(donor.id).await?),
                None => Ok(Vec::new()),
            },
            UserRole::Teacher => match TeacherRepository::new(pool).get_by_user(user.id).await? {
                Some(teacher) => Ok(self.pledges().list_for_teacher(teacher.id).await?),
                None => Ok(Vec::new()),
            },
            UserRole::Admin => Ok(Vec::new()),
        }
    }
}

/// How a lifecycle step moves the donor's running totals.
///
/// `total_pledged` tracks open pledges, so completing moves the amount
/// across to `total_donated` and cancelling drops it.
#[must_use]
pub fn totals_delta(action: PledgeAction, amount: Decimal) -> TotalsDelta {
    match action {
        PledgeAction::Confirm => TotalsDelta::default(),
        PledgeAction::Complete => TotalsDelta {
            pledged: -amount,
            donated: amount,
        },
        PledgeAction::Cancel => TotalsDelta {
            pledged: -amount,
            donated: Decimal::ZERO,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_leaves_totals() {
        assert_eq!(
            totals_delta(PledgeAction::Confirm, Decimal::new(1500, 2)),
            TotalsDelta::default()
        );
    }

    #[test]
    fn test_complete_moves_amount_to_donated() {
        let delta = totals_delta(PledgeAction::Complete, Decimal::new(1500, 2));
        assert_eq!(delta.pledged, Decimal::new(-1500, 2));
        assert_eq!(delta.donated, Decimal::new(1500, 2));
    }

    #[test]
    fn test_cancel_releases_pledged() {
        let delta = totals_delta(PledgeAction::Cancel, Decimal::new(800, 2));
        assert_eq!(delta.pledged, Decimal::new(-800, 2));
        assert_eq!(delta.donated, Decimal::ZERO);
    }

    #[test]
    fn test_pledge_and_complete_nets_out() {
        let amount = Decimal::new(4250, 2);
        let complete = totals_delta(PledgeAction::Complete, amount);
        assert_eq!(amount + complete.pledged, Decimal::ZERO);
        assert_eq!(complete.donated, amount);
    }
}
