//! REST endpoint handlers organized by resource.

pub mod ai;
pub mod analytics;
pub mod feedback;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod reservations;
pub mod reviews;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(menu::routes())
        .merge(orders::routes())
        .merge(reservations::routes())
        .merge(reviews::routes())
        .merge(feedback::routes())
        .merge(notifications::routes())
        .merge(analytics::routes())
        .merge(ai::routes())
}
