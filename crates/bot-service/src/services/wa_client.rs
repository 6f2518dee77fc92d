//! WhatsApp Cloud API HTTP client.
//!
//! This service handles outbound messaging through the Meta Graph API:
//! plain text, call-to-action URL buttons, and interactive list menus.
//!
//! # Security
//!
//! - The bot authenticates with a bearer access token (never logged)
//! - Timeouts prevent hanging connections
//! - Errors are logged server-side with generic messages returned

use crate::errors::BotError;
use crate::observability::metrics;
use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Default timeout for Cloud API requests in seconds.
const WA_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Messaging product identifier required on every Cloud API payload.
const MESSAGING_PRODUCT: &str = "whatsapp";

/// An interactive list menu.
#[derive(Debug, Clone, Serialize)]
pub struct ListMenu {
    /// Header line rendered above the menu body.
    pub header: String,

    /// Menu body text.
    pub body: String,

    /// Label of the button that opens the list.
    pub button: String,

    /// Menu sections.
    pub sections: Vec<ListSection>,
}

/// A titled group of list rows.
#[derive(Debug, Clone, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// One selectable list row.
#[derive(Debug, Clone, Serialize)]
pub struct ListRow {
    /// Developer-assigned ID delivered back in the list reply.
    pub id: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outbound messaging seam.
///
/// The engine depends on this trait so unit tests can substitute
/// [`mock::MockWaClient`] for the real Cloud API client.
#[async_trait]
pub trait WaClientTrait: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), BotError>;

    /// Send a call-to-action URL button message.
    async fn send_cta_url(
        &self,
        to: &str,
        body: &str,
        url: &str,
        display_text: &str,
    ) -> Result<(), BotError>;

    /// Send an interactive list menu.
    async fn send_list_menu(&self, to: &str, menu: &ListMenu) -> Result<(), BotError>;
}

/// HTTP client for the WhatsApp Cloud API messages endpoint.
#[derive(Clone)]
pub struct WaClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Graph API base URL (overridable for tests).
    base_url: String,

    /// Phone number ID the bot sends from.
    phone_number_id: String,

    /// Bearer token for the Cloud API.
    access_token: SecretString,
}

impl WaClient {
    /// Create a new Cloud API client.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Internal` if the HTTP client cannot be built.
    pub fn new(
        base_url: String,
        phone_number_id: String,
        access_token: SecretString,
    ) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WA_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "bot.services.wa_client", error = %e, "Failed to build HTTP client");
                BotError::Internal("Failed to build HTTP client".to_string())
            })?;

        Ok(Self {
            client,
            base_url,
            phone_number_id,
            access_token,
        })
    }

    /// Messages endpoint for the configured phone number.
    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.phone_number_id
        )
    }

    /// POST a message payload and map the response to a result.
    ///
    /// `kind` labels the message type for logs and metrics.
    async fn post_payload(&self, kind: &str, payload: &serde_json::Value) -> Result<(), BotError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.messages_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.access_token.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "bot.services.wa_client", kind = %kind, error = %e, "Cloud API request failed");
                metrics::record_wa_send(kind, "error", start.elapsed());
                BotError::MessagingUnavailable("WhatsApp Cloud API is unreachable".to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            metrics::record_wa_send(kind, "success", start.elapsed());
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        metrics::record_wa_send(kind, "error", start.elapsed());

        if status.is_server_error() {
            warn!(
                target: "bot.services.wa_client",
                kind = %kind,
                status = %status,
                "Cloud API returned server error"
            );
            Err(BotError::MessagingUnavailable(
                "WhatsApp Cloud API is unavailable".to_string(),
            ))
        } else if status.as_u16() == 401 {
            error!(target: "bot.services.wa_client", "Cloud API access token rejected");
            Err(BotError::Internal("Cloud API access token rejected".to_string()))
        } else {
            warn!(
                target: "bot.services.wa_client",
                kind = %kind,
                status = %status,
                body = %error_body,
                "Cloud API rejected message"
            );
            Err(BotError::Internal("Cloud API rejected message".to_string()))
        }
    }
}

#[async_trait]
impl WaClientTrait for WaClient {
    #[instrument(skip(self, body), fields(to = %to))]
    async fn send_text(&self, to: &str, body: &str) -> Result<(), BotError> {
        let payload = serde_json::json!({
            "messaging_product": MESSAGING_PRODUCT,
            "to": to,
            "type": "text",
            "text": { "body": body },
        });

        self.post_payload("text", &payload).await
    }

    #[instrument(skip(self, body, url, display_text), fields(to = %to))]
    async fn send_cta_url(
        &self,
        to: &str,
        body: &str,
        url: &str,
        display_text: &str,
    ) -> Result<(), BotError> {
        let payload = serde_json::json!({
            "messaging_product": MESSAGING_PRODUCT,
            "to": to,
            "type": "interactive",
            "interactive": {
                "type": "cta_url",
                "body": { "text": body },
                "action": {
                    "name": "cta_url",
                    "parameters": {
                        "display_text": display_text,
                        "url": url,
                    },
                },
            },
        });

        self.post_payload("cta_url", &payload).await
    }

    #[instrument(skip(self, menu), fields(to = %to))]
    async fn send_list_menu(&self, to: &str, menu: &ListMenu) -> Result<(), BotError> {
        let payload = serde_json::json!({
            "messaging_product": MESSAGING_PRODUCT,
            "to": to,
            "type": "interactive",
            "interactive": {
                "type": "list",
                "header": { "type": "text", "text": menu.header },
                "body": { "text": menu.body },
                "action": {
                    "button": menu.button,
                    "sections": menu.sections,
                },
            },
        });

        self.post_payload("list", &payload).await
    }
}

/// Mock Cloud API client for unit tests.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// A message captured by [`MockWaClient`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentMessage {
        Text {
            to: String,
            body: String,
        },
        CtaUrl {
            to: String,
            body: String,
            url: String,
            display_text: String,
        },
        ListMenu {
            to: String,
            body: String,
        },
    }

    /// In-memory client that records every send instead of calling out.
    #[derive(Debug, Default)]
    pub struct MockWaClient {
        sent: Mutex<Vec<SentMessage>>,
        fail_sends: bool,
    }

    impl MockWaClient {
        /// A mock that accepts every send.
        pub fn accepting() -> Self {
            Self::default()
        }

        /// A mock whose sends all fail with `MessagingUnavailable`.
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_sends: true,
            }
        }

        /// Messages captured so far, in send order.
        pub fn sent(&self) -> Vec<SentMessage> {
            match self.sent.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }

        fn record(&self, message: SentMessage) -> Result<(), BotError> {
            if let Ok(mut guard) = self.sent.lock() {
                guard.push(message);
            }

            if self.fail_sends {
                return Err(BotError::MessagingUnavailable(
                    "mock send failure".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl WaClientTrait for MockWaClient {
        async fn send_text(&self, to: &str, body: &str) -> Result<(), BotError> {
            self.record(SentMessage::Text {
                to: to.to_string(),
                body: body.to_string(),
            })
        }

        async fn send_cta_url(
            &self,
            to: &str,
            body: &str,
            url: &str,
            display_text: &str,
        ) -> Result<(), BotError> {
            self.record(SentMessage::CtaUrl {
                to: to.to_string(),
                body: body.to_string(),
                url: url.to_string(),
                display_text: display_text.to_string(),
            })
        }

        async fn send_list_menu(&self, to: &str, menu: &ListMenu) -> Result<(), BotError> {
            self.record(SentMessage::ListMenu {
                to: to.to_string(),
                body: menu.body.clone(),
            })
        }
    }
}
