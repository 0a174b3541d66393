//! PostgreSQL implementation of the application store.
//!
//! All queries are runtime-checked `sqlx` queries returning tuple rows that
//! are mapped into the domain records. Enum-like columns are stored as text
//! and parsed on the way out; structured columns (order lines, dietary
//! flags, ingredient lists) are stored as JSONB.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::models::{
    Dietary, Feedback, MenuCategory, MenuItem, Notification, NotificationKind, Order, OrderItem,
    OrderStatus, OrderType, Reservation, ReservationEventType, ReservationStatus, Review,
    ReviewResponse, ReviewStatus, Sentiment,
};
use crate::error::GatewayError;

/// Filters for menu listing.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// Restrict to one category.
    pub category: Option<MenuCategory>,
    /// Restrict by availability.
    pub available: Option<bool>,
    /// Only vegan items.
    pub vegan: bool,
    /// Only vegetarian items.
    pub vegetarian: bool,
    /// Only gluten-free items.
    pub gluten_free: bool,
    /// Only spicy items.
    pub spicy: bool,
    /// Minimum price, inclusive.
    pub min_price: Option<f64>,
    /// Maximum price, inclusive.
    pub max_price: Option<f64>,
    /// Case-insensitive text search over name, description, ingredients.
    pub search: Option<String>,
}

/// Filters and pagination for review listing.
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    /// Restrict to one menu item.
    pub menu_item_id: Option<Uuid>,
    /// Restrict to one star rating.
    pub rating: Option<i16>,
    /// Restrict to one moderation status.
    pub status: Option<ReviewStatus>,
    /// 1-indexed page number.
    pub page: i64,
    /// Page size.
    pub per_page: i64,
}

type MenuItemRow = (
    Uuid,
    String,
    String,
    f64,
    String,
    String,
    String,
    Value,
    Value,
    bool,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

type OrderRow = (
    Uuid,
    Uuid,
    Value,
    f64,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type ReservationRow = (
    Uuid,
    Uuid,
    NaiveDate,
    String,
    i32,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

type ReviewRow = (
    Uuid,
    Uuid,
    Uuid,
    Uuid,
    i16,
    String,
    String,
    Value,
    bool,
    Option<String>,
    Option<DateTime<Utc>>,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

type FeedbackRow = (
    Uuid,
    Uuid,
    Option<Uuid>,
    i16,
    String,
    String,
    f64,
    DateTime<Utc>,
);

type NotificationRow = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    bool,
    Option<String>,
    Option<Value>,
    DateTime<Utc>,
);

const MENU_COLUMNS: &str = "id, name, description, price, category, image_url, image_id, \
                            dietary, ingredients, available, popularity, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, items, total_amount, status, order_type, \
                             delivery_address, phone, special_instructions, created_at, updated_at";
const RESERVATION_COLUMNS: &str = "id, user_id, date, time, guests, event_type, event_details, \
                                   special_requests, status, contact_phone, contact_email, \
                                   created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, user_id, menu_item_id, order_id, rating, title, comment, \
                              images, verified_purchase, response_text, response_at, status, \
                              created_at, updated_at";
const FEEDBACK_COLUMNS: &str =
    "id, user_id, order_id, rating, comment, sentiment, sentiment_score, created_at";
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, message, read, link, data, created_at";

/// PostgreSQL-backed application store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn db_err(e: sqlx::Error) -> GatewayError {
    GatewayError::PersistenceError(e.to_string())
}

fn decode_err(what: &str, value: &str) -> GatewayError {
    GatewayError::PersistenceError(format!("unknown {what}: {value}"))
}

/// Escapes LIKE wildcards so user-supplied search text matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn menu_item_from_row(row: MenuItemRow) -> Result<MenuItem, GatewayError> {
    let (
        id,
        name,
        description,
        price,
        category,
        image_url,
        image_id,
        dietary,
        ingredients,
        available,
        popularity,
        created_at,
        updated_at,
    ) = row;
    Ok(MenuItem {
        id,
        name,
        description,
        price,
        category: MenuCategory::parse(&category)
            .ok_or_else(|| decode_err("menu category", &category))?,
        image_url,
        image_id,
        dietary: serde_json::from_value::<Dietary>(dietary).unwrap_or_default(),
        ingredients: serde_json::from_value(ingredients).unwrap_or_default(),
        available,
        popularity,
        created_at,
        updated_at,
    })
}

fn order_from_row(row: OrderRow) -> Result<Order, GatewayError> {
    let (
        id,
        user_id,
        items,
        total_amount,
        status,
        order_type,
        delivery_address,
        phone,
        special_instructions,
        created_at,
        updated_at,
    ) = row;
    Ok(Order {
        id,
        user_id,
        items: serde_json::from_value::<Vec<OrderItem>>(items)
            .map_err(|e| GatewayError::PersistenceError(format!("corrupt order items: {e}")))?,
        total_amount,
        status: OrderStatus::parse(&status).ok_or_else(|| decode_err("order status", &status))?,
        order_type: OrderType::parse(&order_type)
            .ok_or_else(|| decode_err("order type", &order_type))?,
        delivery_address,
        phone,
        special_instructions,
        created_at,
        updated_at,
    })
}

fn reservation_from_row(row: ReservationRow) -> Result<Reservation, GatewayError> {
    let (
        id,
        user_id,
        date,
        time,
        guests,
        event_type,
        event_details,
        special_requests,
        status,
        contact_phone,
        contact_email,
        created_at,
        updated_at,
    ) = row;
    Ok(Reservation {
        id,
        user_id,
        date,
        time,
        guests,
        event_type: ReservationEventType::parse(&event_type)
            .ok_or_else(|| decode_err("reservation event type", &event_type))?,
        event_details,
        special_requests,
        status: ReservationStatus::parse(&status)
            .ok_or_else(|| decode_err("reservation status", &status))?,
        contact_phone,
        contact_email,
        created_at,
        updated_at,
    })
}

fn review_from_row(row: ReviewRow) -> Result<Review, GatewayError> {
    let (
        id,
        user_id,
        menu_item_id,
        order_id,
        rating,
        title,
        comment,
        images,
        verified_purchase,
        response_text,
        response_at,
        status,
        created_at,
        updated_at,
    ) = row;
    let response = match (response_text, response_at) {
        (Some(text), Some(responded_at)) => Some(ReviewResponse { text, responded_at }),
        _ => None,
    };
    Ok(Review {
        id,
        user_id,
        menu_item_id,
        order_id,
        rating,
        title,
        comment,
        images: serde_json::from_value(images).unwrap_or_default(),
        verified_purchase,
        response,
        status: ReviewStatus::parse(&status).ok_or_else(|| decode_err("review status", &status))?,
        created_at,
        updated_at,
    })
}

fn feedback_from_row(row: FeedbackRow) -> Result<Feedback, GatewayError> {
    let (id, user_id, order_id, rating, comment, sentiment, sentiment_score, created_at) = row;
    Ok(Feedback {
        id,
        user_id,
        order_id,
        rating,
        comment,
        sentiment: Sentiment::parse(&sentiment)
            .ok_or_else(|| decode_err("sentiment", &sentiment))?,
        sentiment_score,
        created_at,
    })
}

fn notification_from_row(row: NotificationRow) -> Result<Notification, GatewayError> {
    let (id, user_id, kind, title, message, read, link, data, created_at) = row;
    Ok(Notification {
        id,
        user_id,
        kind: NotificationKind::parse(&kind)
            .ok_or_else(|| decode_err("notification kind", &kind))?,
        title,
        message,
        read,
        link,
        data,
        created_at,
    })
}

impl PgStore {
    /// Creates a store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ── Menu ────────────────────────────────────────────────────────────

    /// Inserts a new menu item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_menu_item(&self, item: &MenuItem) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO menu_items (id, name, description, price, category, image_url, \
             image_id, dietary, ingredients, available, popularity, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.category.as_str())
        .bind(&item.image_url)
        .bind(&item.image_id)
        .bind(serde_json::to_value(item.dietary).unwrap_or_default())
        .bind(serde_json::to_value(&item.ingredients).unwrap_or_default())
        .bind(item.available)
        .bind(item.popularity)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Overwrites a menu item's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MenuItemNotFound`] if the item does not exist.
    pub async fn update_menu_item(&self, item: &MenuItem) -> Result<(), GatewayError> {
        let result = sqlx::query(
            "UPDATE menu_items SET name = $2, description = $3, price = $4, category = $5, \
             image_url = $6, image_id = $7, dietary = $8, ingredients = $9, available = $10, \
             updated_at = now() WHERE id = $1",
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.category.as_str())
        .bind(&item.image_url)
        .bind(&item.image_id)
        .bind(serde_json::to_value(item.dietary).unwrap_or_default())
        .bind(serde_json::to_value(&item.ingredients).unwrap_or_default())
        .bind(item.available)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::MenuItemNotFound(item.id));
        }
        Ok(())
    }

    /// Deletes a menu item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MenuItemNotFound`] if the item does not exist.
    pub async fn delete_menu_item(&self, id: Uuid) -> Result<(), GatewayError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::MenuItemNotFound(id));
        }
        Ok(())
    }

    /// Loads one menu item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MenuItemNotFound`] if the item does not exist.
    pub async fn get_menu_item(&self, id: Uuid) -> Result<MenuItem, GatewayError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::MenuItemNotFound(id))?;
        menu_item_from_row(row)
    }

    /// Lists menu items matching the filter, most popular first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_menu_items(&self, filter: &MenuFilter) -> Result<Vec<MenuItem>, GatewayError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE 1=1"));

        if let Some(category) = filter.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(available) = filter.available {
            qb.push(" AND available = ").push_bind(available);
        }
        for (flag, column) in [
            (filter.vegan, "vegan"),
            (filter.vegetarian, "vegetarian"),
            (filter.gluten_free, "glutenFree"),
            (filter.spicy, "spicy"),
        ] {
            if flag {
                qb.push(format!(
                    " AND COALESCE((dietary->>'{column}')::boolean, false)"
                ));
            }
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", escape_like(search.trim()));
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR ingredients::text ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY popularity DESC, created_at DESC");

        let rows: Vec<MenuItemRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(menu_item_from_row).collect()
    }

    /// Loads the menu items with the given ids (missing ids are skipped).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn get_menu_items_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MenuItem>, GatewayError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(menu_item_from_row).collect()
    }

    /// Adds `by` to an item's popularity counter.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn bump_popularity(&self, id: Uuid, by: i64) -> Result<(), GatewayError> {
        sqlx::query("UPDATE menu_items SET popularity = popularity + $2 WHERE id = $1")
            .bind(id)
            .bind(by)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Returns the most popular available items.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn top_menu_items(&self, limit: i64) -> Result<Vec<MenuItem>, GatewayError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE available \
             ORDER BY popularity DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(menu_item_from_row).collect()
    }

    // ── Orders ──────────────────────────────────────────────────────────

    /// Inserts a new order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_order(&self, order: &Order) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, items, total_amount, status, order_type, \
             delivery_address, phone, special_instructions, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(serde_json::to_value(&order.items).unwrap_or_default())
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.order_type.as_str())
        .bind(&order.delivery_address)
        .bind(&order.phone)
        .bind(&order.special_instructions)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Loads one order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist.
    pub async fn get_order(&self, id: Uuid) -> Result<Order, GatewayError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::OrderNotFound(id))?;
        order_from_row(row)
    }

    /// Lists a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, GatewayError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(order_from_row).collect()
    }

    /// Lists all orders, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, GatewayError> {
        let rows = if let Some(status) = status {
            sqlx::query_as::<_, OrderRow>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC"
            ))
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, OrderRow>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
            ))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;
        rows.into_iter().map(order_from_row).collect()
    }

    /// Updates an order's status and returns the updated order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::OrderNotFound`] if the order does not exist.
    pub async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, GatewayError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::OrderNotFound(id))?;
        order_from_row(row)
    }

    /// Returns the item names from a user's most recent orders, newest
    /// first, for recommendation context.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn recent_order_item_names(
        &self,
        user_id: Uuid,
        order_limit: i64,
    ) -> Result<Vec<String>, GatewayError> {
        let rows = sqlx::query_as::<_, (Value,)>(
            "SELECT items FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(order_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(items,)| serde_json::from_value::<Vec<OrderItem>>(items).ok())
            .flatten()
            .map(|item| item.name)
            .collect())
    }

    /// Returns `(revenue, order_count)` since `start`, cancelled excluded.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn revenue_since(&self, start: DateTime<Utc>) -> Result<(f64, i64), GatewayError> {
        sqlx::query_as::<_, (f64, i64)>(
            "SELECT COALESCE(SUM(total_amount), 0)::double precision, COUNT(*) FROM orders \
             WHERE created_at >= $1 AND status <> 'cancelled'",
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Returns order counts grouped by status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn order_status_counts(&self) -> Result<Vec<(String, i64)>, GatewayError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    // ── Reservations ────────────────────────────────────────────────────

    /// Inserts a new reservation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_reservation(&self, reservation: &Reservation) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO reservations (id, user_id, date, time, guests, event_type, \
             event_details, special_requests, status, contact_phone, contact_email, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(reservation.id)
        .bind(reservation.user_id)
        .bind(reservation.date)
        .bind(&reservation.time)
        .bind(reservation.guests)
        .bind(reservation.event_type.as_str())
        .bind(&reservation.event_details)
        .bind(&reservation.special_requests)
        .bind(reservation.status.as_str())
        .bind(&reservation.contact_phone)
        .bind(&reservation.contact_email)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Returns `true` if the user already holds an active (pending or
    /// approved) reservation for this date and time.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn has_active_reservation(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        time: &str,
    ) -> Result<bool, GatewayError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE user_id = $1 AND date = $2 \
             AND time = $3 AND status IN ('pending', 'approved'))",
        )
        .bind(user_id)
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Lists a user's reservations, newest date first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_reservations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Reservation>, GatewayError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = $1 \
             ORDER BY date DESC, time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(reservation_from_row).collect()
    }

    /// Lists all reservations, optionally filtered by status and date,
    /// soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_reservations(
        &self,
        status: Option<ReservationStatus>,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Reservation>, GatewayError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE 1=1"
        ));
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(date) = date {
            qb.push(" AND date = ").push_bind(date);
        }
        qb.push(" ORDER BY date ASC, time ASC");

        let rows: Vec<ReservationRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(reservation_from_row).collect()
    }

    /// Updates a reservation's status and returns the updated reservation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReservationNotFound`] if it does not exist.
    pub async fn update_reservation_status(
        &self,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, GatewayError> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::ReservationNotFound(id))?;
        reservation_from_row(row)
    }

    /// Counts active reservations on a date (chat context).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn count_reservations_on(&self, date: NaiveDate) -> Result<i64, GatewayError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE date = $1 \
             AND status IN ('pending', 'approved')",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Returns reservation counts grouped by status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn reservation_status_counts(&self) -> Result<Vec<(String, i64)>, GatewayError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM reservations GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    // ── Reviews ─────────────────────────────────────────────────────────

    /// Inserts a new review.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_review(&self, review: &Review) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO reviews (id, user_id, menu_item_id, order_id, rating, title, comment, \
             images, verified_purchase, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.menu_item_id)
        .bind(review.order_id)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.comment)
        .bind(serde_json::to_value(&review.images).unwrap_or_default())
        .bind(review.verified_purchase)
        .bind(review.status.as_str())
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Loads one review.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotFound`] if the review does not exist.
    pub async fn get_review(&self, id: Uuid) -> Result<Review, GatewayError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::ReviewNotFound(id))?;
        review_from_row(row)
    }

    /// Lists reviews matching the filter with the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_reviews(
        &self,
        filter: &ReviewFilter,
    ) -> Result<(Vec<Review>, i64), GatewayError> {
        fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReviewFilter) {
            if let Some(menu_item_id) = filter.menu_item_id {
                qb.push(" AND menu_item_id = ").push_bind(menu_item_id);
            }
            if let Some(rating) = filter.rating {
                qb.push(" AND rating = ").push_bind(rating);
            }
            if let Some(status) = filter.status {
                qb.push(" AND status = ").push_bind(status.as_str());
            }
        }

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM reviews WHERE 1=1");
        push_conditions(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let page = filter.page.max(1);
        let per_page = filter.per_page.clamp(1, 100);
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE 1=1"));
        push_conditions(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind((page - 1) * per_page);

        let rows: Vec<ReviewRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let reviews = rows
            .into_iter()
            .map(review_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((reviews, total))
    }

    /// Lists approved reviews for one menu item, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_reviews_for_item(
        &self,
        menu_item_id: Uuid,
    ) -> Result<Vec<Review>, GatewayError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE menu_item_id = $1 \
             AND status = 'approved' ORDER BY created_at DESC"
        ))
        .bind(menu_item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(review_from_row).collect()
    }

    /// Returns `(average_rating, review_count)` over approved reviews.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn average_rating(&self, menu_item_id: Uuid) -> Result<(f64, i64), GatewayError> {
        sqlx::query_as::<_, (f64, i64)>(
            "SELECT COALESCE(AVG(rating), 0)::double precision, COUNT(*) FROM reviews \
             WHERE menu_item_id = $1 AND status = 'approved'",
        )
        .bind(menu_item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Returns `true` if the user already reviewed this item for this order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn has_reviewed(
        &self,
        user_id: Uuid,
        menu_item_id: Uuid,
        order_id: Uuid,
    ) -> Result<bool, GatewayError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND menu_item_id = $2 \
             AND order_id = $3)",
        )
        .bind(user_id)
        .bind(menu_item_id)
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Returns `true` if the user has a delivered order with this id that
    /// contains the given menu item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn has_delivered_order_with_item(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<bool, GatewayError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1 AND user_id = $2 \
             AND status = 'delivered' AND items @> $3)",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(serde_json::json!([{ "menuItemId": menu_item_id }]))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Attaches a staff reply to a review and returns the updated review.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotFound`] if the review does not exist.
    pub async fn set_review_response(
        &self,
        id: Uuid,
        text: &str,
    ) -> Result<Review, GatewayError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET response_text = $2, response_at = now(), updated_at = now() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::ReviewNotFound(id))?;
        review_from_row(row)
    }

    /// Updates a review's moderation status and returns the updated review.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReviewNotFound`] if the review does not exist.
    pub async fn set_review_status(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<Review, GatewayError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE reviews SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(GatewayError::ReviewNotFound(id))?;
        review_from_row(row)
    }

    // ── Feedback ────────────────────────────────────────────────────────

    /// Inserts new feedback.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_feedback(&self, feedback: &Feedback) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO feedback (id, user_id, order_id, rating, comment, sentiment, \
             sentiment_score, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(feedback.id)
        .bind(feedback.user_id)
        .bind(feedback.order_id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.sentiment.as_str())
        .bind(feedback.sentiment_score)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Lists a user's feedback, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_feedback_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Feedback>, GatewayError> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(feedback_from_row).collect()
    }

    /// Lists all feedback, optionally filtered by sentiment, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_feedback(
        &self,
        sentiment: Option<Sentiment>,
    ) -> Result<Vec<Feedback>, GatewayError> {
        let rows = if let Some(sentiment) = sentiment {
            sqlx::query_as::<_, FeedbackRow>(&format!(
                "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE sentiment = $1 \
                 ORDER BY created_at DESC"
            ))
            .bind(sentiment.as_str())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, FeedbackRow>(&format!(
                "SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY created_at DESC"
            ))
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;
        rows.into_iter().map(feedback_from_row).collect()
    }

    /// Returns feedback counts grouped by sentiment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn sentiment_counts(&self) -> Result<Vec<(String, i64)>, GatewayError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT sentiment, COUNT(*) FROM feedback GROUP BY sentiment ORDER BY sentiment",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Inserts a notification record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, title, message, read, link, data, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.read)
        .bind(&notification.link)
        .bind(&notification.data)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, GatewayError> {
        let rows = if unread_only {
            sqlx::query_as::<_, NotificationRow>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
                 AND NOT read ORDER BY created_at DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, NotificationRow>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 \
                 ORDER BY created_at DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(db_err)?;
        rows.into_iter().map(notification_from_row).collect()
    }

    /// Marks one of the user's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotificationNotFound`] if it does not exist
    /// or belongs to another user.
    pub async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), GatewayError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(GatewayError::NotificationNotFound(id));
        }
        Ok(())
    }

    /// Marks all of the user's notifications as read, returning the count.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on database failure.
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64, GatewayError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}
