//! Feedback handlers: submission with sentiment analysis and listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{CreateFeedbackRequest, FeedbackQuery};
use crate::app_state::AppState;
use crate::domain::models::Feedback;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::NewFeedback;

/// `POST /feedback` — Submit service feedback.
///
/// The comment is classified by the AI assistant before storing; when
/// analysis is unavailable the sentiment falls back to neutral and the
/// submission still succeeds. Admins are notified in real time.
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    tag = "Feedback",
    summary = "Submit feedback",
    request_body = CreateFeedbackRequest,
    responses(
        (status = 201, description = "Feedback created", body = Feedback),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let sentiment = state.assistant.analyze_sentiment(&req.comment).await;
    let new_feedback = NewFeedback {
        order_id: req.order_id,
        rating: req.rating,
        comment: req.comment,
    };
    let feedback = state
        .service
        .create_feedback(user.user_id, new_feedback, sentiment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": feedback })),
    ))
}

/// `GET /feedback/my-feedback` — The authenticated user's feedback.
#[utoipa::path(
    get,
    path = "/api/v1/feedback/my-feedback",
    tag = "Feedback",
    summary = "List my feedback",
    responses(
        (status = 200, description = "The user's feedback, newest first", body = serde_json::Value),
    )
)]
pub async fn my_feedback(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, GatewayError> {
    let feedback = state.store.list_feedback_for_user(user.user_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": feedback.len(),
        "data": feedback,
    })))
}

/// `GET /feedback/all` — All feedback, optionally by sentiment (admin).
#[utoipa::path(
    get,
    path = "/api/v1/feedback/all",
    tag = "Feedback",
    summary = "List all feedback",
    params(FeedbackQuery),
    responses(
        (status = 200, description = "All feedback, newest first", body = serde_json::Value),
    )
)]
pub async fn all_feedback(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<FeedbackQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let feedback = state.store.list_feedback(query.sentiment).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": feedback.len(),
        "data": feedback,
    })))
}

/// Feedback routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", post(create_feedback))
        .route("/feedback/my-feedback", get(my_feedback))
        .route("/feedback/all", get(all_feedback))
}
