//! Test utilities for the Citabot service.
//!
//! Provides a server harness that spawns the real router on a random
//! port for end-to-end tests. Integration tests typically pair it with
//! a wiremock server standing in for the WhatsApp Cloud API:
//!
//! ```rust,ignore
//! let wa_api = wiremock::MockServer::start().await;
//! let server = TestBotServer::spawn(HashMap::from([(
//!     "GRAPH_API_BASE_URL".to_string(),
//!     wa_api.uri(),
//! )]))
//! .await?;
//! ```

pub mod server_harness;

pub use server_harness::{TestBotServer, TEST_PHONE_NUMBER_ID, TEST_VERIFY_TOKEN};
