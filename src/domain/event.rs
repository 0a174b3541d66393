//! Domain events reflecting business occurrences.
//!
//! Every notifying mutation emits a [`DomainEvent`] through the
//! [`super::Notifier`]. Events are routed to a [`super::ChannelAddress`] by
//! the [`super::ChannelRegistry`], serialized into WebSocket frames, and then
//! discarded; this subsystem never persists them.

use serde_json::Value;

use super::ChannelAddress;
use super::models::{Feedback, Notification, Order, Reservation, Review};

/// Domain event emitted after a notifying business mutation.
///
/// A closed set of kinds, each with a fixed payload: shape mismatches are
/// compile errors rather than runtime surprises.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A customer placed a new order.
    OrderCreated(Order),
    /// An order's status changed.
    OrderUpdated(Order),
    /// A customer requested a new reservation.
    ReservationCreated(Reservation),
    /// A reservation's status changed.
    ReservationUpdated(Reservation),
    /// A customer submitted a new review.
    ReviewCreated(Review),
    /// Staff replied to a review.
    ReviewReplied(Review),
    /// A customer submitted service feedback.
    FeedbackCreated(Feedback),
    /// A notification record was created for a user.
    Notification(Notification),
    /// Free-form system broadcast with a caller-chosen event name.
    Broadcast {
        /// Wire event name.
        event: String,
        /// Arbitrary payload.
        data: Value,
    },
}

impl DomainEvent {
    /// Returns the wire event name clients subscribe to.
    #[must_use]
    pub fn event_name(&self) -> &str {
        match self {
            Self::OrderCreated(_) => "order:new",
            Self::OrderUpdated(_) => "order:update",
            Self::ReservationCreated(_) => "reservation:new",
            Self::ReservationUpdated(_) => "reservation:update",
            Self::ReviewCreated(_) => "review:new",
            Self::ReviewReplied(_) => "review:response",
            Self::FeedbackCreated(_) => "feedback:new",
            Self::Notification(_) => "notification",
            Self::Broadcast { event, .. } => event,
        }
    }

    /// Returns the delivery target, or `None` for broadcast-to-all events.
    ///
    /// Targets are derived from the payload: creations go to the admin
    /// channel, updates and replies go back to the owning user.
    #[must_use]
    pub fn target(&self) -> Option<ChannelAddress> {
        match self {
            Self::OrderCreated(_)
            | Self::ReservationCreated(_)
            | Self::ReviewCreated(_)
            | Self::FeedbackCreated(_) => Some(ChannelAddress::Admin),
            Self::OrderUpdated(order) => Some(ChannelAddress::User(order.user_id)),
            Self::ReservationUpdated(res) => Some(ChannelAddress::User(res.user_id)),
            Self::ReviewReplied(review) => Some(ChannelAddress::User(review.user_id)),
            Self::Notification(n) => Some(ChannelAddress::User(n.user_id)),
            Self::Broadcast { .. } => None,
        }
    }

    /// Serializes the payload for the wire frame.
    #[must_use]
    pub fn payload_json(&self) -> Value {
        let result = match self {
            Self::OrderCreated(order) | Self::OrderUpdated(order) => serde_json::to_value(order),
            Self::ReservationCreated(res) | Self::ReservationUpdated(res) => {
                serde_json::to_value(res)
            }
            Self::ReviewCreated(review) | Self::ReviewReplied(review) => {
                serde_json::to_value(review)
            }
            Self::FeedbackCreated(feedback) => serde_json::to_value(feedback),
            Self::Notification(n) => serde_json::to_value(n),
            Self::Broadcast { data, .. } => return data.clone(),
        };
        result.unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderStatus, OrderType};
    use chrono::Utc;
    use uuid::Uuid;

    fn make_order(user_id: Uuid) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            items: vec![],
            total_amount: 24.0,
            status: OrderStatus::Pending,
            order_type: OrderType::Pickup,
            delivery_address: None,
            phone: "555-0101".to_string(),
            special_instructions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_order_targets_admin() {
        let event = DomainEvent::OrderCreated(make_order(Uuid::new_v4()));
        assert_eq!(event.event_name(), "order:new");
        assert_eq!(event.target(), Some(ChannelAddress::Admin));
    }

    #[test]
    fn order_update_targets_owner() {
        let user_id = Uuid::new_v4();
        let event = DomainEvent::OrderUpdated(make_order(user_id));
        assert_eq!(event.event_name(), "order:update");
        assert_eq!(event.target(), Some(ChannelAddress::User(user_id)));
    }

    #[test]
    fn broadcast_has_no_target() {
        let event = DomainEvent::Broadcast {
            event: "menu:special".to_string(),
            data: serde_json::json!({"dish": "Pad Thai"}),
        };
        assert_eq!(event.event_name(), "menu:special");
        assert_eq!(event.target(), None);
        assert_eq!(
            event.payload_json(),
            serde_json::json!({"dish": "Pad Thai"})
        );
    }

    #[test]
    fn payload_serializes_order() {
        let order = make_order(Uuid::new_v4());
        let event = DomainEvent::OrderCreated(order.clone());
        let payload = event.payload_json();
        assert_eq!(
            payload.get("id").and_then(Value::as_str),
            Some(order.id.to_string().as_str())
        );
        assert_eq!(
            payload.get("totalAmount").and_then(Value::as_f64),
            Some(24.0)
        );
    }
}
