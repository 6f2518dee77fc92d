//! HTTP routes for the bot service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::errors::BotError;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::{BotEngine, WaClient};
use crate::session::SessionStore;
use axum::{middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Conversation sessions.
    pub sessions: SessionStore,

    /// Conversation engine (owns the outbound messaging client).
    pub engine: Arc<BotEngine>,
}

/// Build application state with the real Cloud API client.
///
/// # Errors
///
/// Returns `BotError::Internal` if the HTTP client cannot be built.
pub fn build_state(config: Config) -> Result<AppState, BotError> {
    let wa_client = Arc::new(WaClient::new(
        config.graph_api_base_url.clone(),
        config.phone_number_id.clone(),
        config.access_token.clone(),
    )?);

    let sessions = SessionStore::new();
    let engine = Arc::new(BotEngine::new(
        wa_client,
        sessions.clone(),
        config.video_base_url.clone(),
        config.video_call_subject.clone(),
    ));

    Ok(AppState {
        config,
        sessions,
        engine,
    })
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - public, unversioned
/// - `/ready` - Readiness probe (messaging configuration) - public, unversioned
/// - `/metrics` - Prometheus metrics endpoint - public, unversioned
/// - `GET /webhook` - Cloud API verification handshake
/// - `POST /webhook` - Cloud API event intake
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let service_routes = Router::new()
        // Health check endpoints (unversioned operational endpoints)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // Webhook endpoints: verification handshake + event intake
        .route(
            "/webhook",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Merge routes and apply global middleware layers
    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    service_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // This test verifies that AppState implements Clone,
        // which is required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
