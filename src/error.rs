//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ai::CompletionError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2002,
///     "message": "order not found: ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                |
/// |-----------|-------------------|----------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request            |
/// | 2000–2999 | Not Found         | 404 Not Found              |
/// | 3000–3999 | Server / Upstream | 500 / 502                  |
/// | 4000–4999 | Domain conflicts  | 409 Conflict / 422         |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No authenticated identity on a protected route.
    #[error("authentication required: {0}")]
    Unauthorized(String),

    /// Authenticated identity lacks the required role or ownership.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Menu item with the given ID was not found.
    #[error("menu item not found: {0}")]
    MenuItemNotFound(uuid::Uuid),

    /// Order with the given ID was not found.
    #[error("order not found: {0}")]
    OrderNotFound(uuid::Uuid),

    /// Reservation with the given ID was not found.
    #[error("reservation not found: {0}")]
    ReservationNotFound(uuid::Uuid),

    /// Review with the given ID was not found.
    #[error("review not found: {0}")]
    ReviewNotFound(uuid::Uuid),

    /// Notification with the given ID was not found.
    #[error("notification not found: {0}")]
    NotificationNotFound(uuid::Uuid),

    /// An ordered menu item is missing or switched off.
    #[error("item not available: {0}")]
    ItemUnavailable(String),

    /// The user already holds an active reservation for this slot.
    #[error("an active reservation for this date and time already exists")]
    DuplicateReservation,

    /// The user already reviewed this item for this order.
    #[error("this item has already been reviewed for this order")]
    DuplicateReview,

    /// Reviews require a delivered order containing the item.
    #[error("only items from a delivered order can be reviewed")]
    ReviewNotEligible,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Error propagated from the AI completion subsystem.
    #[error("assistant error: {0}")]
    Assistant(#[from] CompletionError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::MenuItemNotFound(_) => 2001,
            Self::OrderNotFound(_) => 2002,
            Self::ReservationNotFound(_) => 2003,
            Self::ReviewNotFound(_) => 2004,
            Self::NotificationNotFound(_) => 2005,
            Self::ItemUnavailable(_) => 4001,
            Self::DuplicateReservation => 4002,
            Self::DuplicateReview => 4003,
            Self::ReviewNotEligible => 4004,
            Self::PersistenceError(_) => 3001,
            Self::Assistant(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MenuItemNotFound(_)
            | Self::OrderNotFound(_)
            | Self::ReservationNotFound(_)
            | Self::ReviewNotFound(_)
            | Self::NotificationNotFound(_) => StatusCode::NOT_FOUND,
            Self::ItemUnavailable(_) | Self::ReviewNotEligible => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DuplicateReservation | Self::DuplicateReview => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Assistant(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_categories() {
        assert_eq!(
            GatewayError::InvalidRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::OrderNotFound(uuid::Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::DuplicateReservation.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatewayError::Assistant(CompletionError::NotConfigured).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn error_body_serializes_without_null_details() {
        let body = ErrorResponse {
            error: ErrorBody {
                code: 4002,
                message: "conflict".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap_or_default();
        assert!(json.contains("\"code\":4002"));
        assert!(!json.contains("details"));
    }
}
