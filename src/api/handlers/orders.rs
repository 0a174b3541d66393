//! Order handlers: creation, listing, and admin status updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{CreateOrderRequest, OrderQuery, UpdateOrderStatusRequest};
use crate::app_state::AppState;
use crate::domain::models::{Order, OrderType};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::{NewOrder, NewOrderLine};

/// `POST /orders` — Place a new order.
///
/// Lines are priced from the current menu and admins are notified in real
/// time.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "Place an order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Item unavailable", body = ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let new_order = NewOrder {
        items: req
            .items
            .into_iter()
            .map(|line| NewOrderLine {
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            })
            .collect(),
        order_type: req.order_type.unwrap_or(OrderType::Delivery),
        delivery_address: req.delivery_address,
        phone: req.phone,
        special_instructions: req.special_instructions,
    };
    let order = state.service.create_order(user.user_id, new_order).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": order })),
    ))
}

/// `GET /orders/my-orders` — The authenticated user's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/my-orders",
    tag = "Orders",
    summary = "List my orders",
    responses(
        (status = 200, description = "The user's orders, newest first", body = serde_json::Value),
    )
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, GatewayError> {
    let orders = state.store.list_orders_for_user(user.user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

/// `GET /orders` — All orders, optionally filtered by status (admin).
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    summary = "List all orders",
    params(OrderQuery),
    responses(
        (status = 200, description = "All orders, newest first", body = serde_json::Value),
    )
)]
pub async fn all_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let orders = state.store.list_orders(query.status).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

/// `GET /orders/{id}` — One order; owners see their own, admins see all.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    summary = "Get an order",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "The order", body = Order),
        (status = 403, description = "Not the order's owner", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let order = state.store.get_order(id).await?;
    if !user.is_admin() && order.user_id != user.user_id {
        return Err(GatewayError::Forbidden(
            "orders are visible to their owner only".to_string(),
        ));
    }
    Ok(Json(serde_json::json!({ "success": true, "data": order })))
}

/// `PUT /orders/{id}/status` — Update order status (admin).
///
/// The owning customer is notified in real time.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    tag = "Orders",
    summary = "Update order status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 404, description = "Order not found", body = ErrorResponse),
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let order = state.service.update_order_status(id, req.status).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": order })))
}

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(all_orders))
        .route("/orders/my-orders", get(my_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
}
