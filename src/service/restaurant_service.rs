//! Restaurant service: orchestrates business mutations and emits events.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::Notifier;
use crate::domain::models::{
    Feedback, MenuItem, Notification, NotificationKind, Order, OrderItem, OrderStatus, OrderType,
    Reservation, ReservationEventType, ReservationStatus, Review, ReviewStatus,
};
use crate::error::GatewayError;
use crate::persistence::PgStore;

/// One requested order line, by menu item id.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    /// Menu item to order.
    pub menu_item_id: Uuid,
    /// Quantity, at least 1.
    pub quantity: i32,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Requested lines.
    pub items: Vec<NewOrderLine>,
    /// Delivery or pickup.
    pub order_type: OrderType,
    /// Delivery address; required for delivery orders.
    pub delivery_address: Option<String>,
    /// Contact phone number.
    pub phone: String,
    /// Free-form kitchen instructions.
    pub special_instructions: Option<String>,
}

/// Input for creating a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Reservation date.
    pub date: NaiveDate,
    /// Reservation time slot.
    pub time: String,
    /// Number of guests (1–20).
    pub guests: i32,
    /// Occasion.
    pub event_type: ReservationEventType,
    /// Occasion details.
    pub event_details: Option<String>,
    /// Free-form requests.
    pub special_requests: Option<String>,
    /// Contact phone number.
    pub contact_phone: String,
    /// Contact email address.
    pub contact_email: String,
}

/// Input for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Reviewed menu item.
    pub menu_item_id: Uuid,
    /// Order the review is based on.
    pub order_id: Uuid,
    /// Star rating (1–5).
    pub rating: i16,
    /// Short headline.
    pub title: String,
    /// Review body.
    pub comment: String,
    /// Attached image URLs.
    pub images: Vec<String>,
}

/// Input for creating feedback. Sentiment is attached by the caller after
/// AI analysis (neutral when analysis is unavailable).
#[derive(Debug, Clone)]
pub struct NewFeedback {
    /// Related order, if any.
    pub order_id: Option<Uuid>,
    /// Overall rating (1–5).
    pub rating: i16,
    /// Feedback text.
    pub comment: String,
}

/// Orchestration layer for notifying business mutations.
///
/// Stateless coordinator: owns the [`PgStore`] for durable state and a
/// [`Notifier`] for live event emission. Every mutation follows the
/// pattern: validate → persist → emit → return. Emission is best-effort
/// and never fails the mutation.
#[derive(Debug, Clone)]
pub struct RestaurantService {
    store: Arc<PgStore>,
    notifier: Notifier,
}

impl RestaurantService {
    /// Creates a new `RestaurantService`.
    #[must_use]
    pub fn new(store: Arc<PgStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Returns a reference to the inner store.
    #[must_use]
    pub fn store(&self) -> &Arc<PgStore> {
        &self.store
    }

    /// Returns a reference to the inner notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Creates an order for `user_id`, pricing each line from the current
    /// menu, and notifies admins.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on empty or malformed input
    /// and [`GatewayError::ItemUnavailable`] when a line references a
    /// missing or switched-off item.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        new_order: NewOrder,
    ) -> Result<Order, GatewayError> {
        if new_order.items.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "order must contain at least one item".to_string(),
            ));
        }
        if new_order.phone.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "contact phone is required".to_string(),
            ));
        }
        let delivery_address = match new_order.order_type {
            OrderType::Delivery => {
                let address = new_order
                    .delivery_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        GatewayError::InvalidRequest(
                            "delivery address is required for delivery orders".to_string(),
                        )
                    })?;
                Some(address.to_string())
            }
            OrderType::Pickup => None,
        };

        let ids: Vec<Uuid> = new_order.items.iter().map(|l| l.menu_item_id).collect();
        let menu = self.store.get_menu_items_by_ids(&ids).await?;
        let (items, total_amount) = price_order_lines(&menu, &new_order.items)?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            order_type: new_order.order_type,
            delivery_address,
            phone: new_order.phone.trim().to_string(),
            special_instructions: new_order.special_instructions,
            created_at: now,
            updated_at: now,
        };
        self.store.create_order(&order).await?;

        // Popularity feeds ranking and recommendations; a failed bump must
        // not fail the order.
        for line in &order.items {
            if let Err(err) = self
                .store
                .bump_popularity(line.menu_item_id, i64::from(line.quantity))
                .await
            {
                tracing::warn!(%err, item = %line.menu_item_id, "popularity bump failed");
            }
        }

        self.notifier.order_created(&order);
        tracing::info!(order_id = %order.id, %user_id, total = order.total_amount, "order created");
        Ok(order)
    }

    /// Updates an order's status and notifies the owning customer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist.
    pub async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, GatewayError> {
        let order = self.store.update_order_status(id, status).await?;
        self.notifier.order_updated(&order);
        self.record_notification(order_status_notification(&order)).await;
        tracing::info!(order_id = %order.id, status = status.as_str(), "order status updated");
        Ok(order)
    }

    /// Creates a reservation for `user_id` and notifies admins.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DuplicateReservation`] when the user already
    /// holds an active reservation for the slot, or
    /// [`GatewayError::InvalidRequest`] on malformed input.
    pub async fn create_reservation(
        &self,
        user_id: Uuid,
        new_reservation: NewReservation,
    ) -> Result<Reservation, GatewayError> {
        if !(1..=20).contains(&new_reservation.guests) {
            return Err(GatewayError::InvalidRequest(
                "guests must be between 1 and 20".to_string(),
            ));
        }
        if new_reservation.time.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("time is required".to_string()));
        }

        let already = self
            .store
            .has_active_reservation(user_id, new_reservation.date, new_reservation.time.trim())
            .await?;
        if already {
            return Err(GatewayError::DuplicateReservation);
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id,
            date: new_reservation.date,
            time: new_reservation.time.trim().to_string(),
            guests: new_reservation.guests,
            event_type: new_reservation.event_type,
            event_details: new_reservation.event_details,
            special_requests: new_reservation.special_requests,
            status: ReservationStatus::Pending,
            contact_phone: new_reservation.contact_phone,
            contact_email: new_reservation.contact_email,
            created_at: now,
            updated_at: now,
        };
        self.store.create_reservation(&reservation).await?;

        self.notifier.reservation_created(&reservation);
        tracing::info!(reservation_id = %reservation.id, %user_id, "reservation created");
        Ok(reservation)
    }

    /// Updates a reservation's status and notifies the owning customer.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReservationNotFound`] if it does not exist.
    pub async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, GatewayError> {
        let reservation = self.store.update_reservation_status(id, status).await?;
        self.notifier.reservation_updated(&reservation);
        self.record_notification(reservation_status_notification(&reservation))
            .await;
        tracing::info!(reservation_id = %reservation.id, status = status.as_str(), "reservation status updated");
        Ok(reservation)
    }

    /// Creates a review for `user_id` and notifies admins.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotEligible`] without a delivered order
    /// containing the item, [`GatewayError::DuplicateReview`] when already
    /// reviewed, or [`GatewayError::InvalidRequest`] on malformed input.
    pub async fn create_review(
        &self,
        user_id: Uuid,
        new_review: NewReview,
    ) -> Result<Review, GatewayError> {
        validate_review_input(&new_review)?;

        let eligible = self
            .store
            .has_delivered_order_with_item(user_id, new_review.order_id, new_review.menu_item_id)
            .await?;
        if !eligible {
            return Err(GatewayError::ReviewNotEligible);
        }

        let already = self
            .store
            .has_reviewed(user_id, new_review.menu_item_id, new_review.order_id)
            .await?;
        if already {
            return Err(GatewayError::DuplicateReview);
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            user_id,
            menu_item_id: new_review.menu_item_id,
            order_id: new_review.order_id,
            rating: new_review.rating,
            title: new_review.title.trim().to_string(),
            comment: new_review.comment,
            images: new_review.images,
            verified_purchase: true,
            response: None,
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.create_review(&review).await?;

        self.notifier.review_created(&review);
        tracing::info!(review_id = %review.id, %user_id, "review created");
        Ok(review)
    }

    /// Attaches a staff reply to a review and notifies its author.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotFound`] if the review does not
    /// exist, or [`GatewayError::InvalidRequest`] for an empty reply.
    pub async fn respond_to_review(&self, id: Uuid, text: &str) -> Result<Review, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "response text is required".to_string(),
            ));
        }
        let review = self.store.set_review_response(id, text).await?;
        self.notifier.review_replied(&review);
        tracing::info!(review_id = %review.id, "review response added");
        Ok(review)
    }

    /// Updates a review's moderation status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotFound`] if the review does not exist.
    pub async fn moderate_review(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<Review, GatewayError> {
        let review = self.store.set_review_status(id, status).await?;
        tracing::info!(review_id = %review.id, status = status.as_str(), "review moderated");
        Ok(review)
    }

    /// Creates feedback for `user_id` with a precomputed sentiment and
    /// notifies admins.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on malformed input.
    pub async fn create_feedback(
        &self,
        user_id: Uuid,
        new_feedback: NewFeedback,
        sentiment: crate::ai::SentimentScore,
    ) -> Result<Feedback, GatewayError> {
        if !(1..=5).contains(&new_feedback.rating) {
            return Err(GatewayError::InvalidRequest(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        if new_feedback.comment.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "comment is required".to_string(),
            ));
        }

        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id,
            order_id: new_feedback.order_id,
            rating: new_feedback.rating,
            comment: new_feedback.comment,
            sentiment: sentiment.sentiment,
            sentiment_score: sentiment.score,
            created_at: Utc::now(),
        };
        self.store.create_feedback(&feedback).await?;

        self.notifier.feedback_created(&feedback);
        tracing::info!(feedback_id = %feedback.id, %user_id, sentiment = feedback.sentiment.as_str(), "feedback created");
        Ok(feedback)
    }

    /// Broadcasts a free-form system event to every connected client.
    pub fn broadcast(&self, event: &str, data: serde_json::Value) {
        self.notifier.broadcast(event, data);
    }

    /// Persists a notification record and delivers it live. Best-effort on
    /// both sides: a failed insert is logged, never propagated.
    async fn record_notification(&self, notification: Notification) {
        if let Err(err) = self.store.create_notification(&notification).await {
            tracing::warn!(%err, user = %notification.user_id, "notification record insert failed");
        }
        self.notifier.notification(&notification);
    }
}

/// Prices requested lines against the current menu.
///
/// Every line must reference an existing, available item with a positive
/// quantity. Names and unit prices are captured from the menu, not the
/// client.
fn price_order_lines(
    menu: &[MenuItem],
    requested: &[NewOrderLine],
) -> Result<(Vec<OrderItem>, f64), GatewayError> {
    let mut items = Vec::with_capacity(requested.len());
    let mut total = 0.0;
    for line in requested {
        if line.quantity < 1 {
            return Err(GatewayError::InvalidRequest(
                "item quantity must be at least 1".to_string(),
            ));
        }
        let item = menu
            .iter()
            .find(|m| m.id == line.menu_item_id)
            .ok_or_else(|| GatewayError::ItemUnavailable(line.menu_item_id.to_string()))?;
        if !item.available {
            return Err(GatewayError::ItemUnavailable(item.name.clone()));
        }
        total += item.price * f64::from(line.quantity);
        items.push(OrderItem {
            menu_item_id: item.id,
            name: item.name.clone(),
            quantity: line.quantity,
            price: item.price,
        });
    }
    Ok((items, total))
}

fn validate_review_input(new_review: &NewReview) -> Result<(), GatewayError> {
    if !(1..=5).contains(&new_review.rating) {
        return Err(GatewayError::InvalidRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    let title = new_review.title.trim();
    if title.is_empty() || title.len() > 100 {
        return Err(GatewayError::InvalidRequest(
            "title is required (max 100 characters)".to_string(),
        ));
    }
    if new_review.comment.trim().is_empty() || new_review.comment.len() > 1000 {
        return Err(GatewayError::InvalidRequest(
            "comment is required (max 1000 characters)".to_string(),
        ));
    }
    Ok(())
}

fn order_status_notification(order: &Order) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id: order.user_id,
        kind: NotificationKind::Order,
        title: "Order update".to_string(),
        message: format!("Your order is now {}.", order.status.as_str()),
        read: false,
        link: Some("/orders".to_string()),
        data: Some(serde_json::json!({ "orderId": order.id })),
        created_at: Utc::now(),
    }
}

fn reservation_status_notification(reservation: &Reservation) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id: reservation.user_id,
        kind: NotificationKind::Reservation,
        title: "Reservation update".to_string(),
        message: format!(
            "Your reservation for {} at {} is now {}.",
            reservation.date,
            reservation.time,
            reservation.status.as_str()
        ),
        read: false,
        link: Some("/reservations".to_string()),
        data: Some(serde_json::json!({ "reservationId": reservation.id })),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::models::{Dietary, MenuCategory};

    fn make_item(name: &str, price: f64, available: bool) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: "A dish".to_string(),
            price,
            category: MenuCategory::MainCourse,
            image_url: String::new(),
            image_id: String::new(),
            dietary: Dietary::default(),
            ingredients: vec![],
            available,
            popularity: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn lines_are_priced_from_the_menu() {
        let pad_thai = make_item("Pad Thai", 12.5, true);
        let tom_yum = make_item("Tom Yum", 9.0, true);
        let menu = vec![pad_thai.clone(), tom_yum.clone()];

        let requested = vec![
            NewOrderLine {
                menu_item_id: pad_thai.id,
                quantity: 2,
            },
            NewOrderLine {
                menu_item_id: tom_yum.id,
                quantity: 1,
            },
        ];
        let Ok((items, total)) = price_order_lines(&menu, &requested) else {
            panic!("pricing should succeed");
        };
        assert_eq!(items.len(), 2);
        assert!((total - 34.0).abs() < f64::EPSILON);
        assert_eq!(items.first().map(|i| i.name.as_str()), Some("Pad Thai"));
    }

    #[test]
    fn unavailable_item_is_rejected_by_name() {
        let item = make_item("Sold Out Soup", 7.0, false);
        let menu = vec![item.clone()];
        let requested = vec![NewOrderLine {
            menu_item_id: item.id,
            quantity: 1,
        }];
        let Err(GatewayError::ItemUnavailable(name)) = price_order_lines(&menu, &requested) else {
            panic!("expected unavailable error");
        };
        assert_eq!(name, "Sold Out Soup");
    }

    #[test]
    fn unknown_item_is_rejected() {
        let menu = vec![make_item("Pad Thai", 12.5, true)];
        let requested = vec![NewOrderLine {
            menu_item_id: Uuid::new_v4(),
            quantity: 1,
        }];
        assert!(matches!(
            price_order_lines(&menu, &requested),
            Err(GatewayError::ItemUnavailable(_))
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let item = make_item("Pad Thai", 12.5, true);
        let menu = vec![item.clone()];
        let requested = vec![NewOrderLine {
            menu_item_id: item.id,
            quantity: 0,
        }];
        assert!(matches!(
            price_order_lines(&menu, &requested),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn review_input_bounds() {
        let valid = NewReview {
            menu_item_id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            rating: 5,
            title: "Great".to_string(),
            comment: "Loved it".to_string(),
            images: vec![],
        };
        assert!(validate_review_input(&valid).is_ok());

        let bad_rating = NewReview { rating: 6, ..valid.clone() };
        assert!(validate_review_input(&bad_rating).is_err());

        let long_title = NewReview {
            title: "x".repeat(101),
            ..valid.clone()
        };
        assert!(validate_review_input(&long_title).is_err());

        let empty_comment = NewReview {
            comment: "  ".to_string(),
            ..valid
        };
        assert!(validate_review_input(&empty_comment).is_err());
    }

    #[test]
    fn status_notifications_describe_the_change() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: vec![],
            total_amount: 20.0,
            status: OrderStatus::Ready,
            order_type: OrderType::Pickup,
            delivery_address: None,
            phone: "555-0101".to_string(),
            special_instructions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let notification = order_status_notification(&order);
        assert_eq!(notification.user_id, order.user_id);
        assert_eq!(notification.kind, NotificationKind::Order);
        assert!(notification.message.contains("ready"));
    }
}
