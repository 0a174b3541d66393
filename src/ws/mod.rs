//! WebSocket layer: connection handling, message routing, typing relay.
//!
//! The WebSocket endpoint at `/ws` delivers realtime domain events to
//! clients that joined the matching channels, and relays typing indicators
//! between clients.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod typing;
