//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the notification list endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// When `true`, only unread notifications are returned.
    #[serde(default)]
    pub unread: bool,
}

/// Request body for the admin broadcast endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Wire event name delivered to every connected client.
    pub event: String,
    /// Arbitrary payload relayed verbatim.
    #[serde(default)]
    pub data: serde_json::Value,
}
