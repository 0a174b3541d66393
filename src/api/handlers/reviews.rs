//! Review handlers: public listing, creation, and admin moderation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::auth::{AdminUser, AuthUser};
use crate::api::dto::{
    CreateReviewRequest, ModerateReviewRequest, RespondReviewRequest, ReviewQuery,
};
use crate::app_state::AppState;
use crate::domain::models::{Review, ReviewStatus};
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::ReviewFilter;
use crate::service::NewReview;

/// `GET /reviews` — List reviews with filters and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    tag = "Reviews",
    summary = "List reviews",
    description = "Returns reviews matching the filters (approved by default), newest first.",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching reviews with pagination info", body = serde_json::Value),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let per_page = query.limit.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let filter = ReviewFilter {
        menu_item_id: query.menu_item,
        rating: query.rating,
        status: Some(query.status.unwrap_or(ReviewStatus::Approved)),
        page,
        per_page,
    };
    let (reviews, total) = state.store.list_reviews(&filter).await?;
    Ok(Json(serde_json::json!({
        "reviews": reviews,
        "totalPages": (total as u64).div_ceil(per_page as u64),
        "currentPage": page,
        "total": total,
    })))
}

/// `GET /reviews/menu-item/{id}` — Approved reviews for one dish with its
/// average rating.
#[utoipa::path(
    get,
    path = "/api/v1/reviews/menu-item/{id}",
    tag = "Reviews",
    summary = "List reviews for a menu item",
    params(("id" = Uuid, Path, description = "Menu item UUID")),
    responses(
        (status = 200, description = "Reviews and average rating", body = serde_json::Value),
    )
)]
pub async fn item_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let reviews = state.store.list_reviews_for_item(id).await?;
    let (average_rating, total_reviews) = state.store.average_rating(id).await?;
    Ok(Json(serde_json::json!({
        "reviews": reviews,
        "averageRating": average_rating,
        "totalReviews": total_reviews,
    })))
}

/// `POST /reviews` — Create a review.
///
/// Requires a delivered order containing the item; one review per
/// user/item/order. Admins are notified in real time.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    summary = "Create a review",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 409, description = "Already reviewed", body = ErrorResponse),
        (status = 422, description = "No delivered order with this item", body = ErrorResponse),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let new_review = NewReview {
        menu_item_id: req.menu_item,
        order_id: req.order_id,
        rating: req.rating,
        title: req.title,
        comment: req.comment,
        images: req.images,
    };
    let review = state.service.create_review(user.user_id, new_review).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": review })),
    ))
}

/// `PUT /reviews/{id}/respond` — Reply to a review (admin).
///
/// The review's author is notified in real time.
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}/respond",
    tag = "Reviews",
    summary = "Reply to a review",
    params(("id" = Uuid, Path, description = "Review UUID")),
    request_body = RespondReviewRequest,
    responses(
        (status = 200, description = "Reply attached", body = Review),
        (status = 404, description = "Review not found", body = ErrorResponse),
    )
)]
pub async fn respond_to_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RespondReviewRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let review = state.service.respond_to_review(id, &req.text).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": review })))
}

/// `PUT /reviews/{id}/status` — Moderate a review (admin).
#[utoipa::path(
    put,
    path = "/api/v1/reviews/{id}/status",
    tag = "Reviews",
    summary = "Moderate a review",
    params(("id" = Uuid, Path, description = "Review UUID")),
    request_body = ModerateReviewRequest,
    responses(
        (status = 200, description = "Status updated", body = Review),
        (status = 404, description = "Review not found", body = ErrorResponse),
    )
)]
pub async fn moderate_review(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ModerateReviewRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let review = state.service.moderate_review(id, req.status).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": review })))
}

/// Review routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/menu-item/{id}", get(item_reviews))
        .route("/reviews/{id}/respond", put(respond_to_review))
        .route("/reviews/{id}/status", put(moderate_review))
}
