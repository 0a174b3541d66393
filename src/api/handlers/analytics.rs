//! Admin analytics handlers: revenue, top dishes, and status breakdowns.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::auth::AdminUser;
use crate::app_state::AppState;
use crate::error::GatewayError;

/// Query parameters for the revenue endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// Reporting window: `day`, `week` (default), or `month`.
    pub period: Option<String>,
}

/// `GET /analytics/revenue` — Revenue and order count over a window
/// (admin). Cancelled orders are excluded.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue",
    tag = "Analytics",
    summary = "Revenue over a period",
    params(RevenueQuery),
    responses(
        (status = 200, description = "Revenue and order count", body = serde_json::Value),
    )
)]
pub async fn revenue(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<RevenueQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let period = query.period.as_deref().unwrap_or("week");
    let now = Utc::now();
    let start = match period {
        "day" => now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map_or(now - Duration::days(1), |t| t.and_utc()),
        "month" => now - Duration::days(30),
        _ => now - Duration::days(7),
    };

    let (revenue, order_count) = state.store.revenue_since(start).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "revenue": revenue, "orderCount": order_count, "period": period },
    })))
}

/// `GET /analytics/top-dishes` — Most popular dishes (admin).
#[utoipa::path(
    get,
    path = "/api/v1/analytics/top-dishes",
    tag = "Analytics",
    summary = "Top dishes by popularity",
    responses(
        (status = 200, description = "Top five dishes", body = serde_json::Value),
    )
)]
pub async fn top_dishes(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, GatewayError> {
    let items = state.store.top_menu_items(5).await?;
    let data: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            serde_json::json!({
                "name": item.name,
                "popularity": item.popularity,
                "price": item.price,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "success": true, "data": data })))
}

/// `GET /analytics/order-status` — Order counts by status (admin).
#[utoipa::path(
    get,
    path = "/api/v1/analytics/order-status",
    tag = "Analytics",
    summary = "Order status breakdown",
    responses(
        (status = 200, description = "Counts per status", body = serde_json::Value),
    )
)]
pub async fn order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, GatewayError> {
    let counts = state.store.order_status_counts().await?;
    Ok(Json(status_counts_response(counts)))
}

/// `GET /analytics/reservation-status` — Reservation counts by status
/// (admin).
#[utoipa::path(
    get,
    path = "/api/v1/analytics/reservation-status",
    tag = "Analytics",
    summary = "Reservation status breakdown",
    responses(
        (status = 200, description = "Counts per status", body = serde_json::Value),
    )
)]
pub async fn reservation_status(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, GatewayError> {
    let counts = state.store.reservation_status_counts().await?;
    Ok(Json(status_counts_response(counts)))
}

/// `GET /analytics/sentiment` — Feedback counts by sentiment (admin).
#[utoipa::path(
    get,
    path = "/api/v1/analytics/sentiment",
    tag = "Analytics",
    summary = "Feedback sentiment breakdown",
    responses(
        (status = 200, description = "Counts per sentiment", body = serde_json::Value),
    )
)]
pub async fn sentiment(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, GatewayError> {
    let counts = state.store.sentiment_counts().await?;
    Ok(Json(status_counts_response(counts)))
}

fn status_counts_response(counts: Vec<(String, i64)>) -> serde_json::Value {
    let data: Vec<serde_json::Value> = counts
        .into_iter()
        .map(|(status, count)| serde_json::json!({ "status": status, "count": count }))
        .collect();
    serde_json::json!({ "success": true, "data": data })
}

/// Analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/revenue", get(revenue))
        .route("/analytics/top-dishes", get(top_dishes))
        .route("/analytics/order-status", get(order_status))
        .route("/analytics/reservation-status", get(reservation_status))
        .route("/analytics/sentiment", get(sentiment))
}
