//! Test server harness for E2E testing
//!
//! Provides `TestBotServer` for spawning real bot server instances in tests.

use bot_service::config::Config;
use bot_service::routes::{self, build_state, AppState};
use bot_service::session::SessionStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Global metrics handle shared by every test server in the process.
///
/// The Prometheus recorder can only be installed once; later servers
/// reuse the handle (or an unregistered fallback when another harness
/// already installed a recorder).
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            bot_service::observability::metrics::init_metrics_recorder().unwrap_or_else(|_| {
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle()
            })
        })
        .clone()
}

/// Test harness for spawning the bot server in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestBotServer::spawn(HashMap::new()).await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .get(&format!("{}/health", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestBotServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    _handle: JoinHandle<()>,
}

/// Phone number ID used by the default test configuration.
///
/// Tests mocking the Cloud API should expect requests on
/// `/{TEST_PHONE_NUMBER_ID}/messages`.
pub const TEST_PHONE_NUMBER_ID: &str = "104853629";

/// Verify token used by the default test configuration.
pub const TEST_VERIFY_TOKEN: &str = "test-verify-token";

impl TestBotServer {
    /// Spawn a new test server instance.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    ///
    /// # Arguments
    /// * `overrides` - Environment overrides merged over the test
    ///   defaults (e.g. `GRAPH_API_BASE_URL` pointing at a wiremock
    ///   server)
    ///
    /// # Returns
    /// * `Ok(TestBotServer)` - Running server instance
    /// * `Err(anyhow::Error)` - If server spawn fails
    pub async fn spawn(overrides: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        // Build configuration for test environment
        let mut vars = HashMap::from([
            (
                "WA_ACCESS_TOKEN".to_string(),
                "test-access-token".to_string(),
            ),
            (
                "WA_PHONE_NUMBER_ID".to_string(),
                TEST_PHONE_NUMBER_ID.to_string(),
            ),
            ("WA_VERIFY_TOKEN".to_string(), TEST_VERIFY_TOKEN.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // Create application state with the real Cloud API client
        let state = Arc::new(
            build_state(config).map_err(|e| anyhow::anyhow!("Failed to build state: {}", e))?,
        );

        // Build routes using the service's real route builder
        let app = routes::build_routes(state.clone(), test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            // Use into_make_service_with_connect_info to support SocketAddr extraction
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Get the session store shared with the running server.
    ///
    /// Lets tests seed or assert conversation state.
    pub fn sessions(&self) -> &SessionStore {
        &self.state.sessions
    }
}

impl Drop for TestBotServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task to ensure immediate cleanup
        // when the test completes. This stops the server gracefully.
        self._handle.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestBotServer::spawn(HashMap::new()).await?;

        // Verify server is accessible
        assert!(server.url().starts_with("http://127.0.0.1:"));

        // Verify health endpoint works
        let response = reqwest::get(&format!("{}/health", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "OK");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_ready_endpoint() -> Result<(), anyhow::Error> {
        let server = TestBotServer::spawn(HashMap::new()).await?;

        let response = reqwest::get(&format!("{}/ready", server.url())).await?;
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["messaging"], "configured");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_provides_addr() -> Result<(), anyhow::Error> {
        let server = TestBotServer::spawn(HashMap::new()).await?;

        // Verify addr() returns a valid SocketAddr
        let addr = server.addr();

        // Should be localhost
        assert!(addr.ip().is_loopback());

        // Should have a non-zero port
        assert!(addr.port() > 0);

        // Verify addr matches url
        let expected_url = format!("http://{}", addr);
        assert_eq!(server.url(), expected_url);

        Ok(())
    }

    #[tokio::test]
    async fn test_server_applies_overrides() -> Result<(), anyhow::Error> {
        let server = TestBotServer::spawn(HashMap::from([(
            "VIDEO_BASE_URL".to_string(),
            "https://meet.example.org".to_string(),
        )]))
        .await?;

        assert_eq!(server.config().video_base_url, "https://meet.example.org");

        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_servers_different_ports() -> Result<(), anyhow::Error> {
        let server1 = TestBotServer::spawn(HashMap::new()).await?;
        let server2 = TestBotServer::spawn(HashMap::new()).await?;

        // Verify both servers have different addresses
        assert_ne!(server1.addr(), server2.addr());

        // Verify both servers are accessible
        let response1 = reqwest::get(&format!("{}/health", server1.url())).await?;
        assert_eq!(response1.status(), 200);

        let response2 = reqwest::get(&format!("{}/health", server2.url())).await?;
        assert_eq!(response2.status(), 200);

        Ok(())
    }
}
