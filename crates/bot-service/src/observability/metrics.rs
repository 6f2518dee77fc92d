//! Metrics definitions for the bot service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `bot_` prefix for this service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: normalized to the known route set
//! - `status`: 3 values (success, error, timeout)
//! - `kind`: message kinds (text, cta_url, list) / webhook event kinds

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Webhook requests are quick JSON dispatches
        .set_buckets_for_metric(
            Matcher::Prefix("bot_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Cloud API round-trips dominate the webhook path
        .set_buckets_for_metric(
            Matcher::Prefix("bot_wa_send".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set Cloud API send buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `bot_http_requests_total`, `bot_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 400 Bad Request (JSON parse errors)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    // Determine status category for simplified querying
    let status = categorize_status_code(status_code);

    counter!(
        "bot_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "bot_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

// ============================================================================
// Cloud API Send Metrics
// ============================================================================

/// Record an outbound Cloud API send.
///
/// Metric: `bot_wa_sends_total`, `bot_wa_send_duration_seconds`
/// Labels: `kind` (text, cta_url, list), `status` (success, error)
pub fn record_wa_send(kind: &str, status: &str, duration: Duration) {
    counter!(
        "bot_wa_sends_total",
        "kind" => kind.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "bot_wa_send_duration_seconds",
        "kind" => kind.to_string(),
    )
    .record(duration.as_secs_f64());
}

// ============================================================================
// Webhook / Flow Metrics
// ============================================================================

/// Record one processed webhook message.
///
/// Metric: `bot_webhook_messages_total`
/// Labels: `kind` (text, interactive, other)
pub fn record_webhook_message(kind: &str) {
    counter!(
        "bot_webhook_messages_total",
        "kind" => kind.to_string(),
    )
    .increment(1);
}

/// Record one issued video-call link.
///
/// Metric: `bot_video_call_links_total`
pub fn record_video_call_link() {
    counter!("bot_video_call_links_total").increment(1);
}

// ============================================================================
// Helpers
// ============================================================================

/// Normalize an endpoint path to the known route set.
///
/// Unknown paths collapse to "unknown" so scanners cannot blow up the
/// label cardinality.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/webhook" => "/webhook",
        _ => "unknown",
    }
}

/// Collapse a status code into success/error/timeout categories.
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=399 => "success",
        408 => "timeout",
        _ => "error",
    }
}
