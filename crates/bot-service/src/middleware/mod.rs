//! HTTP middleware for the bot service.
//!
//! # Components
//!
//! - `http_metrics` - outermost layer recording metrics for all responses

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
