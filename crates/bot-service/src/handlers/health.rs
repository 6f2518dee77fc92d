//! Health check handlers.
//!
//! Provides health check endpoints for Kubernetes liveness and readiness probes.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks outbound messaging configuration

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Returns a simple "OK" response to indicate the process is running.
/// Does NOT check any dependencies - failure means the process is hung/deadlocked.
///
/// Kubernetes will kill and restart the pod if this fails.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Checks that outbound messaging is configured. The Cloud API itself is
/// not probed here: it is rate limited and its availability surfaces on
/// the send path with its own metrics.
///
/// ## Security
///
/// Error messages are intentionally generic to avoid leaking
/// configuration details. Actual errors are logged server-side.
#[tracing::instrument(skip_all, name = "bot.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.config.graph_api_base_url.is_empty() || state.config.phone_number_id.is_empty() {
        tracing::warn!("Readiness check failed: outbound messaging not configured");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                messaging: Some("unconfigured"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            messaging: Some("configured"),
            error: None,
        }),
    )
}
