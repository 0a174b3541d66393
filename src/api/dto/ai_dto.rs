//! AI endpoint DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /ai/chat`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The customer's message to the concierge.
    pub message: String,
}
