//! Integration tests for the webhook verification handshake.
//!
//! Meta registers the webhook by calling GET /webhook with a mode, the
//! configured verify token, and a challenge that must be echoed back.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use bot_test_utils::{TestBotServer, TEST_VERIFY_TOKEN};
use std::collections::HashMap;

#[tokio::test]
async fn test_verification_echoes_challenge_on_token_match() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!(
        "{}/webhook?hub.mode=subscribe&hub.verify_token={}&hub.challenge=1158201444",
        server.url(),
        TEST_VERIFY_TOKEN
    ))
    .await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "1158201444");
    Ok(())
}

#[tokio::test]
async fn test_verification_rejects_wrong_token() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!(
        "{}/webhook?hub.mode=subscribe&hub.verify_token=not-the-token&hub.challenge=1158201444",
        server.url()
    ))
    .await?;

    assert_eq!(response.status(), 403);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VERIFICATION_FAILED");
    Ok(())
}

#[tokio::test]
async fn test_verification_rejects_wrong_mode() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!(
        "{}/webhook?hub.mode=unsubscribe&hub.verify_token={}&hub.challenge=1158201444",
        server.url(),
        TEST_VERIFY_TOKEN
    ))
    .await?;

    assert_eq!(response.status(), 403);
    Ok(())
}

#[tokio::test]
async fn test_verification_rejects_missing_params() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!("{}/webhook", server.url())).await?;

    assert_eq!(response.status(), 400);
    Ok(())
}

#[tokio::test]
async fn test_webhook_post_rejects_malformed_json() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/webhook", server.url()))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    Ok(())
}
