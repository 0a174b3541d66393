//! Persistence layer: PostgreSQL application store.
//!
//! [`PgStore`] is the collaborator holding durable state: menu items,
//! orders, reservations, reviews, feedback, and the denormalized
//! notification records behind the in-app notification center. Live event
//! delivery never goes through it.

pub mod postgres;

pub use postgres::{MenuFilter, PgStore, ReviewFilter};
