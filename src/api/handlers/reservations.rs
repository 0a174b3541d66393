//! Reservation handlers: creation, listing, and admin status updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{CreateReservationRequest, ReservationQuery, UpdateReservationStatusRequest};
use crate::app_state::AppState;
use crate::domain::models::{Reservation, ReservationEventType};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::NewReservation;

/// `POST /reservations` — Request a reservation.
///
/// Duplicate active reservations for the same slot are rejected; admins are
/// notified in real time.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    summary = "Request a reservation",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Duplicate active reservation", body = ErrorResponse),
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let new_reservation = NewReservation {
        date: req.date,
        time: req.time,
        guests: req.guests,
        event_type: req.event_type.unwrap_or(ReservationEventType::Regular),
        event_details: req.event_details,
        special_requests: req.special_requests,
        contact_phone: req.contact_phone,
        contact_email: req.contact_email,
    };
    let reservation = state
        .service
        .create_reservation(user.user_id, new_reservation)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": reservation })),
    ))
}

/// `GET /reservations/my-reservations` — The authenticated user's
/// reservations.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/my-reservations",
    tag = "Reservations",
    summary = "List my reservations",
    responses(
        (status = 200, description = "The user's reservations", body = serde_json::Value),
    )
)]
pub async fn my_reservations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, GatewayError> {
    let reservations = state.store.list_reservations_for_user(user.user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": reservations.len(),
        "data": reservations,
    })))
}

/// `GET /reservations` — All reservations with filters (admin).
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    summary = "List all reservations",
    params(ReservationQuery),
    responses(
        (status = 200, description = "Matching reservations, soonest first", body = serde_json::Value),
    )
)]
pub async fn all_reservations(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ReservationQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let reservations = state
        .store
        .list_reservations(query.status, query.date)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": reservations.len(),
        "data": reservations,
    })))
}

/// `PUT /reservations/{id}/status` — Update reservation status (admin).
///
/// The owning customer is notified in real time.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/status",
    tag = "Reservations",
    summary = "Update reservation status",
    params(("id" = Uuid, Path, description = "Reservation UUID")),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Reservation updated", body = Reservation),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
    )
)]
pub async fn update_reservation_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReservationStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let reservation = state
        .service
        .update_reservation_status(id, req.status)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": reservation })))
}

/// Reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(create_reservation).get(all_reservations),
        )
        .route("/reservations/my-reservations", get(my_reservations))
        .route(
            "/reservations/{id}/status",
            put(update_reservation_status),
        )
}
