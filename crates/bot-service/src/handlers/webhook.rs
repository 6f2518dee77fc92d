//! Webhook handlers for the WhatsApp Cloud API.
//!
//! Implements the two webhook endpoints:
//!
//! - `GET /webhook` - verification handshake (echo the challenge)
//! - `POST /webhook` - event intake (messages, delivery statuses)
//!
//! # Delivery semantics
//!
//! The Cloud API redelivers events that are not acknowledged with a 2xx,
//! so the intake handler acknowledges everything it could parse, even
//! when processing a message failed. Processing errors are logged
//! server-side; a retry would only duplicate outbound replies.

use crate::errors::BotError;
use crate::models::{VerifyParams, WebhookAck, WebhookEvent};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Expected `hub.mode` value in the verification handshake.
const SUBSCRIBE_MODE: &str = "subscribe";

/// Webhook object type this bot consumes.
const WHATSAPP_OBJECT: &str = "whatsapp_business_account";

// ============================================================================
// Handler: GET /webhook
// ============================================================================

/// Handler for GET /webhook
///
/// Cloud API verification handshake. Meta calls this once when the
/// webhook is registered; the configured verify token must match.
///
/// # Response
///
/// - 200 OK with the raw challenge on success
/// - 403 Forbidden on mode or token mismatch
#[instrument(skip_all, name = "bot.webhook.verify")]
pub async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<String, BotError> {
    if params.mode == SUBSCRIBE_MODE && state.config.verify_token_matches(&params.verify_token) {
        info!(target: "bot.handlers.webhook", "Webhook verified");
        return Ok(params.challenge);
    }

    warn!(
        target: "bot.handlers.webhook",
        mode = %params.mode,
        "Webhook verification failed"
    );
    Err(BotError::VerificationFailed)
}

// ============================================================================
// Handler: POST /webhook
// ============================================================================

/// Handler for POST /webhook
///
/// Event intake. Parses the Cloud API envelope and dispatches every
/// inbound message to the bot engine.
///
/// # Response
///
/// - 200 OK `{"status":"received"}` for any parseable event, including
///   events whose processing failed (see module docs)
/// - 400 Bad Request for malformed JSON
#[instrument(skip_all, name = "bot.webhook.receive")]
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<WebhookAck>, BotError> {
    // Deserialize manually to return 400 (not Axum's default 422)
    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        debug!(target: "bot.handlers.webhook", error = %e, "Invalid webhook body");
        BotError::BadRequest("Invalid request body".to_string())
    })?;

    if event.object != WHATSAPP_OBJECT {
        debug!(
            target: "bot.handlers.webhook",
            object = %event.object,
            "Ignoring non-WhatsApp webhook object"
        );
        return Ok(Json(WebhookAck { status: "received" }));
    }

    for entry in &event.entry {
        for change in &entry.changes {
            // Delivery-status changes carry no messages and need no reply
            if change.field != "messages" {
                continue;
            }

            for message in &change.value.messages {
                metrics::record_webhook_message(message_kind_label(&message.kind));

                let profile_name = change
                    .value
                    .contacts
                    .iter()
                    .find(|contact| contact.wa_id.as_deref() == Some(message.from.as_str()))
                    .and_then(|contact| contact.profile.as_ref())
                    .and_then(|profile| profile.name.as_deref());

                if let Err(e) = state.engine.handle_message(message, profile_name).await {
                    warn!(
                        target: "bot.handlers.webhook",
                        from = %message.from,
                        error = %e,
                        "Failed to process inbound message"
                    );
                }
            }
        }
    }

    Ok(Json(WebhookAck { status: "received" }))
}

/// Bounded label for the webhook message counter.
fn message_kind_label(kind: &str) -> &'static str {
    match kind {
        "text" => "text",
        "interactive" => "interactive",
        _ => "other",
    }
}
