//! Bot service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default WhatsApp Cloud API base URL.
pub const DEFAULT_GRAPH_API_BASE_URL: &str = "https://graph.facebook.com/v22.0";

/// Default video-conferencing base URL.
pub const DEFAULT_VIDEO_BASE_URL: &str = "https://meet.jit.si";

/// Default meeting subject shown by the video service's client.
pub const DEFAULT_VIDEO_CALL_SUBJECT: &str = "Videollamada Consulta";

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Bot service configuration.
///
/// Loaded from environment variables with sensible defaults.
/// The Cloud API access token and webhook verify token are redacted
/// in Debug output to prevent credential leakage.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// WhatsApp Cloud API base URL (default: Meta Graph API v22).
    /// Overridable so tests can point at a local mock server.
    pub graph_api_base_url: String,

    /// Cloud API phone number ID the bot sends from.
    pub phone_number_id: String,

    /// Cloud API bearer token for outbound messages.
    pub access_token: SecretString,

    /// Token expected in the webhook verification handshake.
    pub verify_token: SecretString,

    /// Base URL of the video-conferencing service, trailing slash allowed.
    pub video_base_url: String,

    /// Meeting subject pre-filled in generated video-call links.
    pub video_call_subject: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("graph_api_base_url", &self.graph_api_base_url)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[REDACTED]")
            .field("verify_token", &"[REDACTED]")
            .field("video_base_url", &self.video_base_url)
            .field("video_call_subject", &self.video_call_subject)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid base URL configuration: {0}")]
    InvalidBaseUrl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let access_token = vars
            .get("WA_ACCESS_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("WA_ACCESS_TOKEN".to_string()))?
            .clone();

        let phone_number_id = vars
            .get("WA_PHONE_NUMBER_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("WA_PHONE_NUMBER_ID".to_string()))?
            .clone();

        let verify_token = vars
            .get("WA_VERIFY_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("WA_VERIFY_TOKEN".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let graph_api_base_url = vars
            .get("GRAPH_API_BASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE_URL.to_string());
        validate_base_url("GRAPH_API_BASE_URL", &graph_api_base_url)?;

        let video_base_url = vars
            .get("VIDEO_BASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_VIDEO_BASE_URL.to_string());
        validate_base_url("VIDEO_BASE_URL", &video_base_url)?;

        let video_call_subject = vars
            .get("VIDEO_CALL_SUBJECT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_VIDEO_CALL_SUBJECT.to_string());

        Ok(Config {
            bind_address,
            graph_api_base_url,
            phone_number_id,
            access_token: SecretString::from(access_token),
            verify_token: SecretString::from(verify_token),
            video_base_url,
            video_call_subject,
        })
    }

    /// Compare a candidate token against the configured webhook verify token.
    pub fn verify_token_matches(&self, candidate: &str) -> bool {
        self.verify_token.expose_secret() == candidate
    }
}

/// Base URLs must carry an explicit scheme; a bare host would silently
/// produce relative links downstream.
fn validate_base_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "{var} must not be empty"
        )));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "{var} must start with http:// or https://, got '{value}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("WA_ACCESS_TOKEN".to_string(), "EAAG-test-token".to_string()),
            ("WA_PHONE_NUMBER_ID".to_string(), "104853629".to_string()),
            ("WA_VERIFY_TOKEN".to_string(), "verify-me".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let vars = base_vars();

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.graph_api_base_url, DEFAULT_GRAPH_API_BASE_URL);
        assert_eq!(config.phone_number_id, "104853629");
        assert_eq!(config.access_token.expose_secret(), "EAAG-test-token");
        assert_eq!(config.video_base_url, DEFAULT_VIDEO_BASE_URL);
        assert_eq!(config.video_call_subject, DEFAULT_VIDEO_CALL_SUBJECT);
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert(
            "GRAPH_API_BASE_URL".to_string(),
            "http://localhost:4010".to_string(),
        );
        vars.insert(
            "VIDEO_BASE_URL".to_string(),
            "https://meet.example.org".to_string(),
        );
        vars.insert(
            "VIDEO_CALL_SUBJECT".to_string(),
            "Consulta de Salud".to_string(),
        );

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.graph_api_base_url, "http://localhost:4010");
        assert_eq!(config.video_base_url, "https://meet.example.org");
        assert_eq!(config.video_call_subject, "Consulta de Salud");
    }

    #[test]
    fn test_from_vars_missing_access_token() {
        let mut vars = base_vars();
        vars.remove("WA_ACCESS_TOKEN");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "WA_ACCESS_TOKEN"));
    }

    #[test]
    fn test_from_vars_missing_phone_number_id() {
        let mut vars = base_vars();
        vars.remove("WA_PHONE_NUMBER_ID");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "WA_PHONE_NUMBER_ID"));
    }

    #[test]
    fn test_from_vars_missing_verify_token() {
        let mut vars = base_vars();
        vars.remove("WA_VERIFY_TOKEN");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "WA_VERIFY_TOKEN"));
    }

    #[test]
    fn test_video_base_url_rejects_missing_scheme() {
        let mut vars = base_vars();
        vars.insert("VIDEO_BASE_URL".to_string(), "meet.jit.si".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidBaseUrl(msg)) if msg.contains("VIDEO_BASE_URL"))
        );
    }

    #[test]
    fn test_graph_api_base_url_rejects_empty() {
        let mut vars = base_vars();
        vars.insert("GRAPH_API_BASE_URL".to_string(), String::new());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidBaseUrl(msg)) if msg.contains("must not be empty"))
        );
    }

    #[test]
    fn test_verify_token_matches() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert!(config.verify_token_matches("verify-me"));
        assert!(!config.verify_token_matches("verify-you"));
        assert!(!config.verify_token_matches(""));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("EAAG-test-token"));
        assert!(!debug_output.contains("verify-me"));
    }
}
