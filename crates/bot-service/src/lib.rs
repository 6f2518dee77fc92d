//! Citabot Service Library
//!
//! This library provides the core functionality of the Citabot
//! WhatsApp appointment bot:
//!
//! - Cloud API webhook intake (verification handshake + events)
//! - Conversation state machine with keyword auto-replies and
//!   human-agent handoff
//! - Video-call room creation and meeting-link construction
//! - Outbound messaging (text, CTA-URL button, list menu)
//!
//! # Architecture
//!
//! The service follows the Handler -> Service pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `meeting` - Room slugs and meeting-link construction
//! - `middleware` - HTTP middleware
//! - `models` - Data models
//! - `observability` - Metrics
//! - `routes` - Axum router setup
//! - `services` - Conversation engine and Cloud API client
//! - `session` - In-memory conversation sessions

pub mod config;
pub mod errors;
pub mod handlers;
pub mod meeting;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
pub mod session;
