// ABOUTME: Bearer authentication tests across the HTTP transports
// ABOUTME: Checks challenges, the static secret, OAuth access tokens, and public endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{create_test_gateway, obtain_tokens, register_public_client, TEST_TOKEN};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

#[tokio::test]
async fn test_protected_routes_challenge_anonymous_requests() {
    let (app, _resources) = create_test_gateway().await;

    let requests = [
        AxumTestRequest::get("/info"),
        AxumTestRequest::get("/sse"),
        AxumTestRequest::post("/tools/get_memory").json(&json!({})),
        AxumTestRequest::post("/mcp/call").json(&json!({"tool_name": "get_memory"})),
        AxumTestRequest::post("/stream/execute").json(&json!({"tool_name": "get_memory"})),
        AxumTestRequest::post("/messages?session_id=abc").raw("application/json", "{}"),
    ];

    for request in requests {
        let response = request.send(app.clone()).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let challenge = response.header("www-authenticate").unwrap();
        assert_eq!(
            challenge,
            "Bearer realm=\"http://gateway.test\", resource=\"http://gateway.test/.well-known/oauth-protected-resource\""
        );
        let body: Value = response.json();
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(
            body["resource_metadata"],
            "http://gateway.test/.well-known/oauth-protected-resource"
        );
    }
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let (app, _resources) = create_test_gateway().await;
    AxumTestRequest::get("/info")
        .bearer("definitely-wrong")
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/info")
        .header("authorization", &format!("Basic {TEST_TOKEN}"))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_static_secret_is_accepted() {
    let (app, _resources) = create_test_gateway().await;
    let info: Value = AxumTestRequest::get("/info")
        .bearer(TEST_TOKEN)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(info["principal"], "static");
    assert_eq!(info["endpoints"]["sse"], "http://gateway.test/sse");
}

#[tokio::test]
async fn test_oauth_access_token_is_accepted_everywhere() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let access = tokens["access_token"].as_str().unwrap();

    AxumTestRequest::post("/mcp/call")
        .bearer(access)
        .json(&json!({"tool_name": "get_memory", "arguments": {}}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    AxumTestRequest::post("/stream/execute")
        .bearer(access)
        .json(&json!({"tool_name": "get_memory", "stream": false}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_public_endpoints_need_no_token() {
    let (app, _resources) = create_test_gateway().await;

    for path in [
        "/",
        "/health",
        "/ready",
        "/tools",
        "/docs",
        "/stream",
        "/stream/tools",
        "/stream/health",
        "/.well-known/oauth-authorization-server",
        "/.well-known/oauth-protected-resource",
    ] {
        AxumTestRequest::get(path)
            .send(app.clone())
            .await
            .assert_status(StatusCode::OK);
    }
}

#[tokio::test]
async fn test_base_url_follows_forwarded_headers_without_public_url() {
    let mut config = common::test_config();
    config.public_base_url = None;
    let (app, _resources) =
        common::create_gateway_with(config, mcp_gateway::tools::KnowledgeStore::new()).await;

    let response = AxumTestRequest::get("/info")
        .header("host", "gw.example")
        .header("x-forwarded-proto", "https")
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert!(response
        .header("www-authenticate")
        .unwrap()
        .contains("resource=\"https://gw.example/.well-known/oauth-protected-resource\""));
}
