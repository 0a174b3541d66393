//! Notification-center handlers and the admin broadcast endpoint.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{BroadcastRequest, NotificationQuery};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /notifications` — The authenticated user's notification records.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "List my notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notification records, newest first", body = serde_json::Value),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let notifications = state
        .store
        .list_notifications(user.user_id, query.unread)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": notifications.len(),
        "data": notifications,
    })))
}

/// `PUT /notifications/{id}/read` — Mark one notification as read.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    tag = "Notifications",
    summary = "Mark a notification as read",
    params(("id" = Uuid, Path, description = "Notification UUID")),
    responses(
        (status = 200, description = "Marked as read", body = serde_json::Value),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    state.store.mark_notification_read(id, user.user_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `PUT /notifications/read-all` — Mark all notifications as read.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    tag = "Notifications",
    summary = "Mark all notifications as read",
    responses(
        (status = 200, description = "Count of notifications marked", body = serde_json::Value),
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, GatewayError> {
    let count = state
        .store
        .mark_all_notifications_read(user.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "count": count })))
}

/// `POST /notifications/broadcast` — Broadcast a system event to every
/// connected client (admin).
#[utoipa::path(
    post,
    path = "/api/v1/notifications/broadcast",
    tag = "Notifications",
    summary = "Broadcast a system event",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Event broadcast", body = serde_json::Value),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.event.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "event name is required".to_string(),
        ));
    }
    state.service.broadcast(req.event.trim(), req.data);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", put(mark_read))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/broadcast", post(broadcast))
}
