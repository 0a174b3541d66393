//! Review DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::models::ReviewStatus;

/// Query parameters for `GET /reviews`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReviewQuery {
    /// Restrict to one menu item.
    pub menu_item: Option<Uuid>,
    /// Restrict to one star rating.
    pub rating: Option<i16>,
    /// Restrict to one moderation status; defaults to approved.
    pub status: Option<ReviewStatus>,
    /// 1-indexed page number.
    pub page: Option<i64>,
    /// Page size (max 100).
    pub limit: Option<i64>,
}

/// Request body for `POST /reviews`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// Reviewed menu item.
    pub menu_item: Uuid,
    /// Order the review is based on.
    #[serde(rename = "order")]
    pub order_id: Uuid,
    /// Star rating (1–5).
    pub rating: i16,
    /// Short headline (max 100 characters).
    pub title: String,
    /// Review body (max 1000 characters).
    pub comment: String,
    /// Attached image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Request body for `PUT /reviews/{id}/respond`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RespondReviewRequest {
    /// Staff reply text.
    pub text: String,
}

/// Request body for `PUT /reviews/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ModerateReviewRequest {
    /// New moderation status.
    pub status: ReviewStatus,
}
