//! Reservation DTOs.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::models::{ReservationEventType, ReservationStatus};

/// Request body for `POST /reservations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Reservation date.
    pub date: NaiveDate,
    /// Reservation time slot (e.g. `"19:30"`).
    pub time: String,
    /// Number of guests (1–20).
    pub guests: i32,
    /// Occasion; defaults to regular.
    #[serde(default)]
    pub event_type: Option<ReservationEventType>,
    /// Occasion details.
    pub event_details: Option<String>,
    /// Free-form requests.
    pub special_requests: Option<String>,
    /// Contact phone number.
    pub contact_phone: String,
    /// Contact email address.
    pub contact_email: String,
}

/// Request body for `PUT /reservations/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateReservationStatusRequest {
    /// New lifecycle status.
    pub status: ReservationStatus,
}

/// Query parameters for the admin reservation list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReservationQuery {
    /// Restrict to one status.
    pub status: Option<ReservationStatus>,
    /// Restrict to one date.
    pub date: Option<NaiveDate>,
}
