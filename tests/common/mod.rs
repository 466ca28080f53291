// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds an in-memory gateway and walks clients through the OAuth flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `mcp_gateway`

use std::sync::{Arc, Once};

use axum::Router;
use mcp_gateway::{
    config::environment::ServerConfig,
    mcp::{GatewayServer, ServerResources},
    oauth2_server::secrets::s256_challenge,
    tools::{KnowledgeStore, ToolRegistry},
};
use serde_json::{json, Value};

use crate::helpers::axum_test::AxumTestRequest;

/// Static shared secret accepted by every test gateway
pub const TEST_TOKEN: &str = "test-static-token";
/// Redirect URI registered for test clients
pub const REDIRECT_URI: &str = "http://localhost:8765/callback";
/// PKCE verifier used by the helpers
pub const VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Test configuration with a fixed static token and public base URL
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::for_static_token(TEST_TOKEN);
    config.public_base_url = Some("http://gateway.test".to_owned());
    config
}

/// Gateway router plus its shared resources, backed by an empty knowledge store
pub async fn create_test_gateway() -> (Router, Arc<ServerResources>) {
    create_gateway_with(test_config(), KnowledgeStore::new()).await
}

/// Gateway router plus its shared resources, backed by the seeded knowledge store
pub async fn create_seeded_gateway() -> (Router, Arc<ServerResources>) {
    create_gateway_with(test_config(), KnowledgeStore::seeded().await).await
}

/// Gateway over an explicit configuration and store
pub async fn create_gateway_with(
    config: ServerConfig,
    store: KnowledgeStore,
) -> (Router, Arc<ServerResources>) {
    init_test_logging();
    let tools = Arc::new(ToolRegistry::with_builtin_tools(Arc::new(store)));
    let resources = Arc::new(
        ServerResources::in_memory(config, tools)
            .await
            .expect("Failed to build test resources"),
    );
    let router = GatewayServer::new(Arc::clone(&resources)).router();
    (router, resources)
}

/// Registered test client
pub struct TestClient {
    pub client_id: String,
    pub client_secret: Option<String>,
}

/// Register a confidential client over HTTP
pub async fn register_confidential_client(app: &Router) -> TestClient {
    register_client(app, None).await
}

/// Register a public (PKCE-only) client over HTTP
pub async fn register_public_client(app: &Router) -> TestClient {
    register_client(app, Some("none")).await
}

async fn register_client(app: &Router, auth_method: Option<&str>) -> TestClient {
    let mut body = json!({
        "client_name": "Test Client",
        "redirect_uris": [REDIRECT_URI],
    });
    if let Some(method) = auth_method {
        body["token_endpoint_auth_method"] = json!(method);
    }

    let registered: Value = AxumTestRequest::post("/oauth/register")
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(axum::http::StatusCode::CREATED)
        .json();

    TestClient {
        client_id: registered["client_id"].as_str().unwrap().to_owned(),
        client_secret: registered["client_secret"].as_str().map(str::to_owned),
    }
}

/// Run the authorize step and return the issued code
pub async fn authorize(app: &Router, client: &TestClient, verifier: &str) -> String {
    let uri = format!(
        "/oauth/authorize?response_type=code&client_id={}&redirect_uri={}&code_challenge={}&code_challenge_method=S256&state=xyz",
        client.client_id,
        urlencoding::encode(REDIRECT_URI),
        s256_challenge(verifier),
    );
    let response = AxumTestRequest::get(&uri)
        .send(app.clone())
        .await
        .assert_status(axum::http::StatusCode::FOUND);

    let location = response.header("location").expect("Missing Location header");
    let url = url::Url::parse(&location).expect("Location is not a URL");
    let params: std::collections::HashMap<String, String> =
        url.query_pairs().into_owned().collect();
    assert_eq!(params.get("state").map(String::as_str), Some("xyz"));
    params.get("code").expect("Missing code").clone()
}

/// Form fields for exchanging `code` with `verifier`
pub fn code_exchange_form(client: &TestClient, code: &str, verifier: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("grant_type".to_owned(), "authorization_code".to_owned()),
        ("client_id".to_owned(), client.client_id.clone()),
        ("code".to_owned(), code.to_owned()),
        ("redirect_uri".to_owned(), REDIRECT_URI.to_owned()),
        ("code_verifier".to_owned(), verifier.to_owned()),
    ];
    if let Some(secret) = &client.client_secret {
        form.push(("client_secret".to_owned(), secret.clone()));
    }
    form
}

/// Complete authorize plus code exchange and return the token response body
pub async fn obtain_tokens(app: &Router, client: &TestClient) -> Value {
    let code = authorize(app, client, VERIFIER).await;
    AxumTestRequest::post("/oauth/token")
        .form(&code_exchange_form(client, &code, VERIFIER))
        .send(app.clone())
        .await
        .assert_status(axum::http::StatusCode::OK)
        .json()
}
