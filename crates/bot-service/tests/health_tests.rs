//! Integration tests for the operational endpoints.
//!
//! Covers `/health`, `/ready`, and `/metrics` through a real server
//! instance spawned by `TestBotServer`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use bot_test_utils::TestBotServer;
use std::collections::HashMap;

#[tokio::test]
async fn test_health_returns_ok() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_reports_messaging_configured() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["messaging"], "configured");
    // No error field when ready
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_renders() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    // Generate at least one request so counters exist
    let _ = reqwest::get(format!("{}/health", server.url())).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;
    assert_eq!(response.status(), 200);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<()> {
    let server = TestBotServer::spawn(HashMap::new()).await?;

    let response = reqwest::get(format!("{}/nonexistent", server.url())).await?;
    assert_eq!(response.status(), 404);
    Ok(())
}
