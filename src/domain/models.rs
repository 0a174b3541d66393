//! Core restaurant records shared by the REST layer, the event system, and
//! the persistence layer.
//!
//! All records serialize to camelCase JSON, which is the wire format the
//! single-page front end consumes both over REST and inside WebSocket event
//! frames.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Menu category discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCategory {
    /// Starters.
    Appetizer,
    /// Main dishes.
    MainCourse,
    /// Desserts.
    Dessert,
    /// Drinks.
    Beverage,
    /// Salads.
    Salad,
    /// Soups.
    Soup,
}

impl MenuCategory {
    /// Returns the category as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Appetizer => "appetizer",
            Self::MainCourse => "main-course",
            Self::Dessert => "dessert",
            Self::Beverage => "beverage",
            Self::Salad => "salad",
            Self::Soup => "soup",
        }
    }

    /// Parses a stored string form back into a category.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "appetizer" => Some(Self::Appetizer),
            "main-course" => Some(Self::MainCourse),
            "dessert" => Some(Self::Dessert),
            "beverage" => Some(Self::Beverage),
            "salad" => Some(Self::Salad),
            "soup" => Some(Self::Soup),
            _ => None,
        }
    }
}

/// Dietary flags attached to a menu item.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dietary {
    /// Contains no animal products.
    #[serde(default)]
    pub vegan: bool,
    /// Contains no meat.
    #[serde(default)]
    pub vegetarian: bool,
    /// Contains no gluten.
    #[serde(default)]
    pub gluten_free: bool,
    /// Noticeably spicy.
    #[serde(default)]
    pub spicy: bool,
}

/// A dish on the menu.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Unique item identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Short description shown on the menu.
    pub description: String,
    /// Price in the restaurant's currency.
    pub price: f64,
    /// Menu category.
    pub category: MenuCategory,
    /// Public URL of the item image ("" when none). The image itself lives
    /// in external object storage; this service only stores the reference.
    #[serde(default)]
    pub image_url: String,
    /// Object-storage identifier of the image ("" when none).
    #[serde(default)]
    pub image_id: String,
    /// Dietary flags.
    #[serde(default)]
    pub dietary: Dietary,
    /// Ingredient list.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Whether the item can currently be ordered.
    pub available: bool,
    /// Order counter used for ranking and recommendations.
    pub popularity: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet in the kitchen.
    Pending,
    /// Being prepared.
    Preparing,
    /// Ready for pickup or dispatch.
    Ready,
    /// Handed to the customer.
    Delivered,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// Returns the status as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored string form back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "preparing" => Some(Self::Preparing),
            "ready" => Some(Self::Ready),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Delivered to an address.
    Delivery,
    /// Picked up at the restaurant.
    Pickup,
}

impl OrderType {
    /// Returns the order type as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }

    /// Parses a stored string form back into an order type.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delivery" => Some(Self::Delivery),
            "pickup" => Some(Self::Pickup),
            _ => None,
        }
    }
}

/// One priced line of an order.
///
/// The name and price are captured at order time so later menu edits do not
/// rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Ordered menu item.
    pub menu_item_id: Uuid,
    /// Item name at order time.
    pub name: String,
    /// Quantity ordered.
    pub quantity: i32,
    /// Unit price at order time.
    pub price: f64,
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: Uuid,
    /// Ordering user.
    pub user_id: Uuid,
    /// Order lines.
    pub items: Vec<OrderItem>,
    /// Total across all lines.
    pub total_amount: f64,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Delivery or pickup.
    pub order_type: OrderType,
    /// Delivery address; present for delivery orders.
    pub delivery_address: Option<String>,
    /// Contact phone number.
    pub phone: String,
    /// Free-form kitchen instructions.
    pub special_instructions: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Reservation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Awaiting staff review.
    Pending,
    /// Confirmed by staff.
    Approved,
    /// Declined by staff.
    Rejected,
    /// Visit took place.
    Completed,
    /// Cancelled by either side.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the status as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored string form back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns `true` for statuses that still occupy a table slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

/// Occasion attached to a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationEventType {
    /// Ordinary visit.
    Regular,
    /// Birthday celebration.
    Birthday,
    /// Corporate event.
    Corporate,
    /// Anniversary celebration.
    Anniversary,
    /// Anything else.
    Other,
}

impl ReservationEventType {
    /// Returns the event type as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Birthday => "birthday",
            Self::Corporate => "corporate",
            Self::Anniversary => "anniversary",
            Self::Other => "other",
        }
    }

    /// Parses a stored string form back into an event type.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "birthday" => Some(Self::Birthday),
            "corporate" => Some(Self::Corporate),
            "anniversary" => Some(Self::Anniversary),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A table reservation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: Uuid,
    /// Reserving user.
    pub user_id: Uuid,
    /// Reservation date.
    pub date: NaiveDate,
    /// Reservation time slot (e.g. `"19:30"`).
    pub time: String,
    /// Number of guests (1–20).
    pub guests: i32,
    /// Occasion.
    pub event_type: ReservationEventType,
    /// Occasion details.
    pub event_details: Option<String>,
    /// Free-form requests (seating, accessibility, …).
    pub special_requests: Option<String>,
    /// Lifecycle status.
    pub status: ReservationStatus,
    /// Contact phone number.
    pub contact_phone: String,
    /// Contact email address.
    pub contact_email: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Review moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting moderation.
    Pending,
    /// Publicly visible.
    Approved,
    /// Hidden by moderation.
    Rejected,
}

impl ReviewStatus {
    /// Returns the status as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a stored string form back into a status.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Staff reply attached to a review.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Reply text.
    pub text: String,
    /// When the reply was written.
    pub responded_at: DateTime<Utc>,
}

/// A dish review left by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review identifier.
    pub id: Uuid,
    /// Review author.
    pub user_id: Uuid,
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
    /// Image URLs attached by the author.
    #[serde(default)]
    pub images: Vec<String>,
    /// Whether the author demonstrably ordered the item.
    pub verified_purchase: bool,
    /// Staff reply, if any.
    pub response: Option<ReviewResponse>,
    /// Moderation status.
    pub status: ReviewStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Sentiment classification of a feedback comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Favourable comment.
    Positive,
    /// Unfavourable comment.
    Negative,
    /// Neither, or analysis unavailable.
    Neutral,
}

impl Sentiment {
    /// Returns the sentiment as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    /// Parses a stored string form back into a sentiment.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// General service feedback from a customer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Unique feedback identifier.
    pub id: Uuid,
    /// Submitting user.
    pub user_id: Uuid,
    /// Related order, if any.
    pub order_id: Option<Uuid>,
    /// Overall rating (1–5).
    pub rating: i16,
    /// Feedback text.
    pub comment: String,
    /// AI-classified sentiment (neutral when analysis is unavailable).
    pub sentiment: Sentiment,
    /// Sentiment score in `[-1.0, 1.0]`.
    pub sentiment_score: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Notification record category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Order-related notification.
    Order,
    /// Reservation-related notification.
    Reservation,
    /// Marketing or promotion notice.
    Promotion,
    /// Operational system notice.
    System,
    /// Review-related notification.
    Review,
}

impl NotificationKind {
    /// Returns the kind as its stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Reservation => "reservation",
            Self::Promotion => "promotion",
            Self::System => "system",
            Self::Review => "review",
        }
    }

    /// Parses a stored string form back into a kind.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "order" => Some(Self::Order),
            "reservation" => Some(Self::Reservation),
            "promotion" => Some(Self::Promotion),
            "system" => Some(Self::System),
            "review" => Some(Self::Review),
            _ => None,
        }
    }
}

/// Denormalized notification record kept for the in-app notification center.
///
/// This is the durable trace of a notification; live WebSocket delivery is
/// best-effort and independent of it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// Recipient user.
    pub user_id: Uuid,
    /// Notification category.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Optional in-app link target.
    pub link: Option<String>,
    /// Optional structured payload.
    pub data: Option<serde_json::Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn category_string_round_trip() {
        for cat in [
            MenuCategory::Appetizer,
            MenuCategory::MainCourse,
            MenuCategory::Dessert,
            MenuCategory::Beverage,
            MenuCategory::Salad,
            MenuCategory::Soup,
        ] {
            assert_eq!(MenuCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(MenuCategory::parse("sandwich"), None);
    }

    #[test]
    fn order_status_string_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn active_reservation_statuses() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Approved.is_active());
        assert!(!ReservationStatus::Rejected.is_active());
        assert!(!ReservationStatus::Completed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn menu_item_serializes_camel_case() {
        let item = MenuItem {
            id: Uuid::new_v4(),
            name: "Tom Yum".to_string(),
            description: "Hot and sour soup".to_string(),
            price: 9.5,
            category: MenuCategory::Soup,
            image_url: String::new(),
            image_id: String::new(),
            dietary: Dietary {
                spicy: true,
                ..Dietary::default()
            },
            ingredients: vec!["shrimp".to_string(), "lemongrass".to_string()],
            available: true,
            popularity: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&item).unwrap_or_default();
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"glutenFree\""));
        assert!(json.contains("\"soup\""));
    }
}
