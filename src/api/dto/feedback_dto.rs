//! Feedback DTOs.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::models::Sentiment;

/// Request body for `POST /feedback`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    /// Related order, if any.
    #[serde(rename = "order")]
    pub order_id: Option<Uuid>,
    /// Overall rating (1–5).
    pub rating: i16,
    /// Feedback text.
    pub comment: String,
}

/// Query parameters for the admin feedback list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedbackQuery {
    /// Restrict to one sentiment.
    pub sentiment: Option<Sentiment>,
}
