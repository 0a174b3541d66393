//! bistro-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST, WebSocket, and SSE endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bistro_gateway::ai::{AssistantService, GroqClient};
use bistro_gateway::api;
use bistro_gateway::app_state::AppState;
use bistro_gateway::config::GatewayConfig;
use bistro_gateway::domain::{ChannelRegistry, Notifier};
use bistro_gateway::persistence::PgStore;
use bistro_gateway::service::RestaurantService;
use bistro_gateway::ws::handler::ws_handler;
use bistro_gateway::ws::typing::TypingChannel;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting bistro-gateway");

    // Database
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;
    let store = Arc::new(PgStore::new(pool));

    // Realtime layer
    let registry = Arc::new(ChannelRegistry::new());
    let typing = TypingChannel::new(config.typing_channel_capacity);
    let notifier = Notifier::new(Arc::clone(&registry));

    // AI assistant; runs disabled when no key or model is configured
    let backend = match &config.groq_api_key {
        Some(key) => Some(GroqClient::new(
            config.groq_api_base.clone(),
            key.clone(),
            config.groq_timeout(),
        )?),
        None => None,
    };
    let assistant = Arc::new(AssistantService::new(backend, config.groq_model.clone()));

    // Service layer
    let service = Arc::new(RestaurantService::new(Arc::clone(&store), notifier));

    // Build application state
    let app_state = AppState {
        service,
        store,
        registry,
        typing,
        assistant,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
