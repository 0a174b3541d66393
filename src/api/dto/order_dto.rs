//! Order DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::models::{OrderStatus, OrderType};

/// One requested order line.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDto {
    /// Menu item to order.
    pub menu_item_id: Uuid,
    /// Quantity, at least 1.
    pub quantity: i32,
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Requested lines.
    pub items: Vec<OrderLineDto>,
    /// Delivery or pickup; defaults to delivery.
    #[serde(default)]
    pub order_type: Option<OrderType>,
    /// Delivery address; required for delivery orders.
    pub delivery_address: Option<String>,
    /// Contact phone number.
    pub phone: String,
    /// Free-form kitchen instructions.
    pub special_instructions: Option<String>,
}

/// Request body for `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// New lifecycle status.
    pub status: OrderStatus,
}

/// Query parameters for the admin order list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    /// Restrict to one status.
    pub status: Option<OrderStatus>,
}
