//! Service layer: business logic orchestration.
//!
//! [`RestaurantService`] coordinates the notifying mutations: it validates
//! input, persists through the store, and emits events through the
//! [`crate::domain::Notifier`].

pub mod restaurant_service;

pub use restaurant_service::{
    NewFeedback, NewOrder, NewOrderLine, NewReservation, NewReview, RestaurantService,
};
