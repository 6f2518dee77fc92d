//! Integration tests for text-message flows.
//!
//! Covers keyword auto-replies, human-agent handoff, agent-active
//! silence, and delivery-status events through the real webhook path
//! with a mocked Cloud API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use bot_service::session::ConversationStatus;
use bot_test_utils::{TestBotServer, TEST_PHONE_NUMBER_ID};
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CUSTOMER_PHONE: &str = "5215551234567";

fn send_ack() -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "messages": [{ "id": "wamid.SENT" }]
    })
}

fn text_event(body: &str) -> serde_json::Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "102290129340398",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "contacts": [{
                        "profile": { "name": "Maria Lopez" },
                        "wa_id": CUSTOMER_PHONE,
                    }],
                    "messages": [{
                        "from": CUSTOMER_PHONE,
                        "id": "wamid.TEXT",
                        "timestamp": "1717000000",
                        "type": "text",
                        "text": { "body": body }
                    }]
                }
            }]
        }]
    })
}

async fn mount_messages_mock(wa_api: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{TEST_PHONE_NUMBER_ID}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(send_ack()))
        .expect(expected)
        .mount(wa_api)
        .await;
}

async fn spawn_against(wa_api: &MockServer) -> Result<TestBotServer> {
    TestBotServer::spawn(HashMap::from([(
        "GRAPH_API_BASE_URL".to_string(),
        wa_api.uri(),
    )]))
    .await
}

async fn post_event(server: &TestBotServer, event: &serde_json::Value) -> Result<u16> {
    let response = reqwest::Client::new()
        .post(format!("{}/webhook", server.url()))
        .json(event)
        .send()
        .await?;
    Ok(response.status().as_u16())
}

#[tokio::test]
async fn test_greeting_gets_auto_reply() -> Result<()> {
    let wa_api = MockServer::start().await;
    mount_messages_mock(&wa_api, 1).await;
    let server = spawn_against(&wa_api).await?;

    let status = post_event(&server, &text_event("Hola, buenos días")).await?;
    assert_eq!(status, 200);

    let requests = wa_api.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);

    let reply: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(reply["type"], "text");
    assert!(reply["text"]["body"].as_str().unwrap().starts_with("¡Hola!"));
    Ok(())
}

#[tokio::test]
async fn test_agent_keyword_hands_off_conversation() -> Result<()> {
    let wa_api = MockServer::start().await;
    mount_messages_mock(&wa_api, 1).await;
    let server = spawn_against(&wa_api).await?;

    let status = post_event(&server, &text_event("quiero hablar con un agente")).await?;
    assert_eq!(status, 200);

    let session = server.sessions().snapshot(CUSTOMER_PHONE).await.unwrap();
    assert_eq!(session.status, ConversationStatus::Waiting);

    let requests = wa_api.received_requests().await.unwrap_or_default();
    let reply: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert!(reply["text"]["body"]
        .as_str()
        .unwrap()
        .contains("agente humano"));
    Ok(())
}

#[tokio::test]
async fn test_agent_active_conversation_gets_no_bot_reply() -> Result<()> {
    let wa_api = MockServer::start().await;
    mount_messages_mock(&wa_api, 0).await;
    let server = spawn_against(&wa_api).await?;

    // A human agent is attending this conversation
    server.sessions().get_or_create(CUSTOMER_PHONE, None).await;
    server
        .sessions()
        .set_status(CUSTOMER_PHONE, ConversationStatus::Active)
        .await;

    let status = post_event(&server, &text_event("hola")).await?;
    assert_eq!(status, 200);

    let requests = wa_api.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_text_gets_prompt_and_menu() -> Result<()> {
    let wa_api = MockServer::start().await;
    mount_messages_mock(&wa_api, 2).await;
    let server = spawn_against(&wa_api).await?;

    let status = post_event(&server, &text_event("asdf qwerty")).await?;
    assert_eq!(status, 200);

    let requests = wa_api.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);

    let prompt: serde_json::Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(prompt["type"], "text");

    let menu: serde_json::Value = serde_json::from_slice(&requests[1].body)?;
    assert_eq!(menu["interactive"]["type"], "list");
    Ok(())
}

#[tokio::test]
async fn test_delivery_status_event_is_acked_silently() -> Result<()> {
    let wa_api = MockServer::start().await;
    mount_messages_mock(&wa_api, 0).await;
    let server = spawn_against(&wa_api).await?;

    // Delivery-status change: no messages array, nothing to reply to
    let event = serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "102290129340398",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "statuses": [{ "id": "wamid.SENT", "status": "delivered" }]
                }
            }]
        }]
    });

    let status = post_event(&server, &event).await?;
    assert_eq!(status, 200);

    let requests = wa_api.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
    Ok(())
}
