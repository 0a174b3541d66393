//! Typed event emission on top of the channel registry.
//!
//! [`Notifier`] offers one method per domain event kind. Each method derives
//! the delivery target from its payload and publishes through the
//! [`ChannelRegistry`]. Emitting is always infallible and non-blocking: the
//! business operation that triggered it (order creation, status change, …)
//! must succeed even when nobody is listening or the realtime layer was
//! never wired up.

use std::sync::Arc;

use serde_json::Value;

use super::models::{Feedback, Notification, Order, Reservation, Review};
use super::{ChannelRegistry, DomainEvent};

/// Emits typed domain events to connected clients.
///
/// Constructed with a registry for normal operation, or [`Notifier::disabled`]
/// to turn every emit into a silent no-op (headless tooling, tests of code
/// paths that should not depend on the realtime layer).
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    registry: Option<Arc<ChannelRegistry>>,
}

impl Notifier {
    /// Creates a notifier publishing through the given registry.
    #[must_use]
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    /// Creates a notifier that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { registry: None }
    }

    fn emit(&self, event: DomainEvent) {
        let Some(registry) = &self.registry else {
            tracing::debug!(event = event.event_name(), "notifier disabled, event dropped");
            return;
        };
        let delivered = match event.target() {
            Some(address) => registry.publish(address, &event),
            None => registry.broadcast(&event),
        };
        tracing::info!(event = event.event_name(), delivered, "event emitted");
    }

    /// Notifies admins of a newly placed order.
    pub fn order_created(&self, order: &Order) {
        self.emit(DomainEvent::OrderCreated(order.clone()));
    }

    /// Notifies the owning customer of an order status change.
    pub fn order_updated(&self, order: &Order) {
        self.emit(DomainEvent::OrderUpdated(order.clone()));
    }

    /// Notifies admins of a newly requested reservation.
    pub fn reservation_created(&self, reservation: &Reservation) {
        self.emit(DomainEvent::ReservationCreated(reservation.clone()));
    }

    /// Notifies the owning customer of a reservation status change.
    pub fn reservation_updated(&self, reservation: &Reservation) {
        self.emit(DomainEvent::ReservationUpdated(reservation.clone()));
    }

    /// Notifies admins of a newly submitted review.
    pub fn review_created(&self, review: &Review) {
        self.emit(DomainEvent::ReviewCreated(review.clone()));
    }

    /// Notifies the review author of a staff reply.
    pub fn review_replied(&self, review: &Review) {
        self.emit(DomainEvent::ReviewReplied(review.clone()));
    }

    /// Notifies admins of newly submitted feedback.
    pub fn feedback_created(&self, feedback: &Feedback) {
        self.emit(DomainEvent::FeedbackCreated(feedback.clone()));
    }

    /// Delivers a notification record to its recipient.
    pub fn notification(&self, notification: &Notification) {
        self.emit(DomainEvent::Notification(notification.clone()));
    }

    /// Broadcasts a free-form event to every connected client.
    pub fn broadcast(&self, event: &str, data: Value) {
        self.emit(DomainEvent::Broadcast {
            event: event.to_string(),
            data,
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderStatus, OrderType};
    use crate::domain::{ChannelAddress, ConnectionId};
    use chrono::Utc;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn make_order(user_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            items: vec![],
            total_amount: 18.0,
            status: OrderStatus::Preparing,
            order_type: OrderType::Delivery,
            delivery_address: Some("12 Market St".to_string()),
            phone: "555-0101".to_string(),
            special_instructions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn disabled_notifier_is_a_silent_noop() {
        let notifier = Notifier::disabled();
        // Must not panic, block, or error.
        notifier.order_created(&make_order(Uuid::new_v4()));
        notifier.broadcast("system:test", serde_json::json!({}));
    }

    #[test]
    fn order_update_is_routed_to_owner() {
        let registry = Arc::new(ChannelRegistry::new());
        let notifier = Notifier::new(Arc::clone(&registry));

        let user_id = Uuid::new_v4();
        let conn = ConnectionId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(conn, tx);
        registry.join(conn, ChannelAddress::User(user_id));

        notifier.order_updated(&make_order(user_id));

        let Some(event) = rx.try_recv().ok() else {
            panic!("owner should receive the update");
        };
        assert_eq!(event.event_name(), "order:update");
    }

    #[test]
    fn emit_does_not_mutate_payload() {
        let registry = Arc::new(ChannelRegistry::new());
        let notifier = Notifier::new(registry);
        let order = make_order(Uuid::new_v4());
        let before = serde_json::to_value(&order).unwrap_or_default();
        notifier.order_created(&order);
        let after = serde_json::to_value(&order).unwrap_or_default();
        assert_eq!(before, after);
    }
}
