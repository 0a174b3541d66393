//! # bistro-gateway
//!
//! REST API and WebSocket gateway for a smart restaurant ordering,
//! reservation, and AI concierge service.
//!
//! The gateway manages the menu, orders, reservations, reviews, and
//! feedback; routes realtime domain events to per-user and admin channels
//! over WebSocket; and proxies AI features (recommendations, streaming
//! chat, sentiment analysis) to an external completion API with model
//! fallback.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket, SSE)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Connections (ws/)
//!     │
//!     ├── RestaurantService (service/)
//!     ├── ChannelRegistry + Notifier (domain/)
//!     ├── AssistantService + FallbackClient (ai/)
//!     │
//!     ├── PostgreSQL Store (persistence/)
//!     └── Groq / OpenAI-compatible completion API
//! ```

pub mod ai;
pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
