//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::ai::Assistant;
use crate::domain::ChannelRegistry;
use crate::persistence::PgStore;
use crate::service::RestaurantService;
use crate::ws::typing::TypingChannel;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Restaurant service for notifying business mutations.
    pub service: Arc<RestaurantService>,
    /// Application store for reads and non-notifying writes.
    pub store: Arc<PgStore>,
    /// Channel registry backing WebSocket event routing.
    pub registry: Arc<ChannelRegistry>,
    /// Typing-indicator relay channel.
    pub typing: TypingChannel,
    /// AI assistant for recommendations, chat, and sentiment.
    pub assistant: Arc<Assistant>,
}
