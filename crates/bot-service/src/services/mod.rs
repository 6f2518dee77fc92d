//! Service layer for the bot.
//!
//! This module contains services that interact with external systems
//! and encapsulate business logic.
//!
//! # Components
//!
//! - `wa_client` - HTTP client for the WhatsApp Cloud API
//! - `engine` - conversation state machine and flows

pub mod engine;
pub mod wa_client;

pub use engine::BotEngine;
// Messaging seam exposed for external use
pub use wa_client::{WaClient, WaClientTrait};
// Mock Cloud API client for testing (exposed for integration tests)
#[allow(unused_imports)]
pub use wa_client::mock::MockWaClient;
