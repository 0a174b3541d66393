//! Domain layer: restaurant records, routing addresses, and the event system.
//!
//! This module contains the server-side domain model: the records the
//! application manages, connection identity, the channel registry for live
//! event routing, and the typed notifier the service layer emits through.

pub mod channel;
pub mod connection_id;
pub mod event;
pub mod models;
pub mod notifier;
pub mod registry;

pub use channel::ChannelAddress;
pub use connection_id::ConnectionId;
pub use event::DomainEvent;
pub use notifier::Notifier;
pub use registry::ChannelRegistry;
