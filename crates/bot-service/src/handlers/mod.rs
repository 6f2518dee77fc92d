//! HTTP request handlers for the bot service.
//!
//! # Components
//!
//! - `health` - liveness and readiness probes
//! - `webhook` - Cloud API verification handshake and event intake
//! - `metrics` - Prometheus metrics exposition

pub mod health;
pub mod metrics;
pub mod webhook;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use webhook::{receive_webhook, verify_webhook};
