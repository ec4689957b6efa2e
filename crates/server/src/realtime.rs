//! Realtime fan-out for the `/ws` channel.
//!
//! Services publish after their transaction commits. Delivery is best
//! effort: a client that falls more than [`CHANNEL_CAPACITY`] events behind
//! skips ahead, and nothing is replayed on reconnect.

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::broadcast;

use wishlisted_core::{PledgeStatus, WishlistId, WishlistItemId};

use crate::models::{Pledge, PledgeListing};

/// Events buffered per subscriber before it starts lagging.
pub const CHANNEL_CAPACITY: usize = 256;

/// Event type tag sent as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Something happened worth showing on the public activity feed.
    ActivityUpdate,
    /// A pledge changed status.
    PledgeUpdate,
    /// A wishlist or its items changed.
    WishlistUpdate,
}

/// A message on the realtime channel, sent as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
}

/// What happened to a wishlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WishlistChange {
    Created,
    Updated,
    Deleted,
    ItemsChanged,
}

impl RealtimeEvent {
    /// A new pledge, for the activity feed. Uses the listing's donor name,
    /// which is already masked for anonymous donors.
    #[must_use]
    pub fn pledge_created(listing: &PledgeListing) -> Self {
        Self {
            kind: EventKind::ActivityUpdate,
            data: json!({
                "action": "pledge_created",
                "pledgeId": listing.id,
                "donorName": listing.donor_name,
                "itemName": listing.item_name,
                "wishlistId": listing.wishlist_id,
                "wishlistTitle": listing.wishlist_title,
                "teacherName": listing.teacher_name,
                "quantity": listing.quantity,
                "createdAt": listing.created_at,
            }),
        }
    }

    /// A pledge moved to a new status.
    #[must_use]
    pub fn pledge_status(pledge: &Pledge, wishlist_id: Option<WishlistId>) -> Self {
        Self {
            kind: EventKind::PledgeUpdate,
            data: json!({
                "pledgeId": pledge.id,
                "itemId": pledge.item_id,
                "wishlistId": wishlist_id,
                "status": pledge.status,
                "quantity": pledge.quantity,
            }),
        }
    }

    /// A wishlist (or one of its items) changed.
    #[must_use]
    pub fn wishlist_changed(
        wishlist_id: WishlistId,
        change: WishlistChange,
        item_id: Option<WishlistItemId>,
    ) -> Self {
        Self {
            kind: EventKind::WishlistUpdate,
            data: json!({
                "wishlistId": wishlist_id,
                "change": change,
                "itemId": item_id,
            }),
        }
    }

    /// Encode as a WebSocket text payload.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode realtime event");
            String::from("{}")
        })
    }
}

/// Broadcast hub shared through application state.
#[derive(Debug, Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    /// Create a hub with [`CHANNEL_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Send an event to every connected client.
    ///
    /// Returns how many subscribers received it; zero when nobody listens.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        let kind = event.kind;
        self.tx.send(event).map_or(0, |receivers| {
            tracing::debug!(?kind, receivers, "Published realtime event");
            receivers
        })
    }

    /// A new receiver that sees events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    /// Number of connected clients.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// `true` when a pledge status is worth an activity entry as well.
#[must_use]
pub const fn is_public_milestone(status: PledgeStatus) -> bool {
    matches!(status, PledgeStatus::Completed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};
    use wishlisted_core::{DonorId, PaymentMethod, PledgeId};

    use super::*;

    fn pledge(status: PledgeStatus) -> Pledge {
        Pledge {
            id: PledgeId::new(7),
            item_id: Some(WishlistItemId::new(3)),
            donor_id: DonorId::new(2),
            amount: Decimal::new(2000, 2),
            quantity: 2,
            payment_method: PaymentMethod::BankTransfer,
            status,
            transaction_reference: "WL-ABCDEFGHJK".to_string(),
            message: None,
            confirmation_message: None,
            created_at: Utc::now(),
            confirmed_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_event_wire_shape() {
        let event = RealtimeEvent::wishlist_changed(
            WishlistId::new(4),
            WishlistChange::ItemsChanged,
            Some(WishlistItemId::new(9)),
        );
        let json: Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(json["type"], "wishlist_update");
        assert_eq!(json["data"]["wishlistId"], 4);
        assert_eq!(json["data"]["change"], "items_changed");
        assert_eq!(json["data"]["itemId"], 9);
    }

    #[test]
    fn test_pledge_status_event() {
        let event = RealtimeEvent::pledge_status(
            &pledge(PledgeStatus::Confirmed),
            Some(WishlistId::new(1)),
        );
        assert_eq!(event.kind, EventKind::PledgeUpdate);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "pledge_update");
        assert_eq!(json["data"]["status"], "confirmed");
        assert_eq!(json["data"]["pledgeId"], 7);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = RealtimeHub::new();
        let event = RealtimeEvent::wishlist_changed(WishlistId::new(1), WishlistChange::Created, None);
        assert_eq!(hub.publish(event), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives() {
        let hub = RealtimeHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        let event = RealtimeEvent::wishlist_changed(WishlistId::new(2), WishlistChange::Updated, None);
        assert_eq!(hub.publish(event.clone()), 2);

        assert_eq!(a.recv().await.unwrap(), event);
        assert_eq!(b.recv().await.unwrap(), event);
        assert!(matches!(a.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe();
        for id in 0..=i32::try_from(CHANNEL_CAPACITY).unwrap() {
            hub.publish(RealtimeEvent::wishlist_changed(
                WishlistId::new(id),
                WishlistChange::Updated,
                None,
            ));
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn test_public_milestones() {
        assert!(is_public_milestone(PledgeStatus::Completed));
        assert!(!is_public_milestone(PledgeStatus::Confirmed));
    }
}
