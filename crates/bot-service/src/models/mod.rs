//! Bot service models.
//!
//! Serde models for the WhatsApp Cloud API webhook envelope and for the
//! service's own HTTP responses. The Cloud API delivers events as
//! `entry[].changes[].value` with optional `messages` and `contacts`
//! arrays; fields the bot does not consume are left out and ignored
//! during deserialization.

use serde::{Deserialize, Serialize};

// ============================================================================
// Webhook verification (GET /webhook)
// ============================================================================

/// Query parameters of the Cloud API verification handshake.
///
/// Meta sends `hub.mode=subscribe`, the configured verify token, and a
/// random challenge that must be echoed back verbatim on success.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: String,

    #[serde(rename = "hub.verify_token")]
    pub verify_token: String,

    #[serde(rename = "hub.challenge")]
    pub challenge: String,
}

// ============================================================================
// Webhook event envelope (POST /webhook)
// ============================================================================

/// Top-level webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Always "whatsapp_business_account" for Cloud API events.
    pub object: String,

    /// Business account entries carrying the actual changes.
    #[serde(default)]
    pub entry: Vec<Entry>,
}

/// One business-account entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// WhatsApp business account ID.
    pub id: String,

    /// Field changes within this entry.
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// A single field change.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// Changed field, "messages" for inbound traffic.
    pub field: String,

    /// Change payload.
    pub value: ChangeValue,
}

/// Payload of a "messages" change.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    /// Messaging product, "whatsapp".
    pub messaging_product: Option<String>,

    /// Receiving phone number metadata.
    pub metadata: Option<Metadata>,

    /// Sender contact cards (profile name lookup).
    #[serde(default)]
    pub contacts: Vec<Contact>,

    /// Inbound messages. Absent on delivery-status events.
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// Receiving phone number metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub display_phone_number: Option<String>,
    pub phone_number_id: Option<String>,
}

/// Sender contact card.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    /// Sender's WhatsApp ID (phone number).
    pub wa_id: Option<String>,

    /// Sender profile.
    pub profile: Option<Profile>,
}

/// Sender profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Display name the sender configured in WhatsApp.
    pub name: Option<String>,
}

/// One inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Sender phone number.
    pub from: String,

    /// Cloud API message ID ("wamid...").
    pub id: String,

    /// Unix timestamp as a string, per the Cloud API.
    pub timestamp: Option<String>,

    /// Message type: "text", "interactive", "image", ...
    #[serde(rename = "type")]
    pub kind: String,

    /// Text content, present when `kind == "text"`.
    pub text: Option<TextBody>,

    /// Interactive reply, present when `kind == "interactive"`.
    pub interactive: Option<InteractivePayload>,
}

impl IncomingMessage {
    /// The tapped button/list-row ID, if this is an interactive reply.
    pub fn reply_id(&self) -> Option<&str> {
        let interactive = self.interactive.as_ref()?;
        interactive
            .button_reply
            .as_ref()
            .or(interactive.list_reply.as_ref())
            .map(|reply| reply.id.as_str())
    }

    /// The text body, if this is a text message.
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.body.as_str())
    }
}

/// Body of a text message.
#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Interactive reply payload.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractivePayload {
    /// Reply type: "button_reply" or "list_reply".
    #[serde(rename = "type")]
    pub kind: String,

    /// Present for button replies.
    pub button_reply: Option<InteractiveReply>,

    /// Present for list replies.
    pub list_reply: Option<InteractiveReply>,
}

/// A tapped button or list row.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractiveReply {
    /// Developer-assigned ID of the tapped element.
    pub id: String,

    /// Human-readable title of the tapped element.
    pub title: Option<String>,
}

// ============================================================================
// Service responses
// ============================================================================

/// Acknowledgement returned for every processed webhook POST.
///
/// The Cloud API retries deliveries on non-2xx responses, so processing
/// failures are logged server-side and still acknowledged.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Outbound messaging configuration status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
