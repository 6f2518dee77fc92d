//! Prometheus metrics exposition handler.

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Renders the current metric registry in Prometheus text format.
/// The handle is installed once at startup; rendering is cheap.
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
