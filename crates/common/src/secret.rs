//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with Citabot-specific
//! guidance. Use these types for all sensitive values like API tokens,
//! webhook verify tokens, and other credentials.
//!
//! # Compile-Time Safety
//!
//! The key insight is that `SecretBox<T>` and `SecretString` implement `Debug`
//! with redaction, so any code that derives `Debug` on a struct containing secrets
//! will automatically get safe logging behavior. This makes it **impossible** to
//! accidentally log secrets via `{:?}` or tracing.
//!
//! # Memory Safety
//!
//! Secrets are automatically zeroized when dropped, preventing sensitive
//! data from lingering in memory after use.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct ChannelCredentials {
//!     phone_number_id: String,
//!     access_token: SecretString,  // Safe: Debug shows "[REDACTED]"
//! }
//!
//! let creds = ChannelCredentials {
//!     phone_number_id: "104853629".to_string(),
//!     access_token: SecretString::from("EAAG...long-lived-token"),
//! };
//!
//! // This is safe - the token is redacted
//! println!("{:?}", creds);
//!
//! // To access the actual value, you must explicitly call expose_secret()
//! let token: &str = creds.access_token.expose_secret();
//! ```
//!
//! # Citabot Usage Guidelines
//!
//! Use `SecretString` for:
//! - WhatsApp Cloud API access tokens
//! - Webhook verify tokens
//! - Any bearer credential sent on outbound requests
//!
//! Use `SecretBox<T>` for:
//! - Custom secret types (e.g., `SecretBox<[u8]>` for binary keys)
//!
//! # Serde Integration
//!
//! With the `serde` feature enabled, secrets can be deserialized from JSON:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct ChannelConfig {
//!     phone_number_id: String,
//!     access_token: SecretString,
//! }
//!
//! let json = r#"{"phone_number_id": "104853629", "access_token": "EAAG-secret"}"#;
//! let config: ChannelConfig = serde_json::from_str(json).unwrap();
//!
//! // Debug output is safe
//! println!("{:?}", config);
//! // phone_number_id is visible, access_token is redacted
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
