// ABOUTME: Refresh token and revocation tests for the OAuth 2.1 authorization server
// ABOUTME: Covers the grace refresh policy, scope narrowing, idempotent revocation, and token pairing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::{http::StatusCode, Router};
use common::{
    create_gateway_with, create_test_gateway, obtain_tokens, register_confidential_client,
    register_public_client, test_config, TestClient,
};
use helpers::axum_test::AxumTestRequest;
use mcp_gateway::{oauth2_server::RefreshPolicy, tools::KnowledgeStore};
use serde_json::Value;

async fn refresh(app: &Router, client: &TestClient, refresh_token: &str, scope: Option<&str>) -> (StatusCode, Value) {
    let mut form = vec![
        ("grant_type".to_owned(), "refresh_token".to_owned()),
        ("client_id".to_owned(), client.client_id.clone()),
        ("refresh_token".to_owned(), refresh_token.to_owned()),
    ];
    if let Some(secret) = &client.client_secret {
        form.push(("client_secret".to_owned(), secret.clone()));
    }
    if let Some(scope) = scope {
        form.push(("scope".to_owned(), scope.to_owned()));
    }
    let response = AxumTestRequest::post("/oauth/token")
        .form(&form)
        .send(app.clone())
        .await;
    (response.status_code(), response.json())
}

async fn info_status(app: &Router, token: &str) -> StatusCode {
    AxumTestRequest::get("/info")
        .bearer(token)
        .send(app.clone())
        .await
        .status_code()
}

async fn revoke(app: &Router, token: &str, hint: Option<&str>) {
    let mut form = vec![("token", token)];
    if let Some(hint) = hint {
        form.push(("token_type_hint", hint));
    }
    let body: Value = AxumTestRequest::post("/oauth/revoke")
        .form(&form)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["status"], "revoked");
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token_and_grace_access() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_confidential_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let old_access = tokens["access_token"].as_str().unwrap();
    let refresh_token = tokens["refresh_token"].as_str().unwrap();

    let (status, refreshed) = refresh(&app, &client, refresh_token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["refresh_token"], refresh_token);
    assert_ne!(refreshed["access_token"], old_access);

    assert_eq!(info_status(&app, old_access).await, StatusCode::OK);
    assert_eq!(
        info_status(&app, refreshed["access_token"].as_str().unwrap()).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_invalidate_policy_kills_previous_access_token() {
    let mut config = test_config();
    config.oauth.refresh_policy = RefreshPolicy::Invalidate;
    let (app, _resources) = create_gateway_with(config, KnowledgeStore::new()).await;
    let client = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let old_access = tokens["access_token"].as_str().unwrap();

    let (status, refreshed) =
        refresh(&app, &client, tokens["refresh_token"].as_str().unwrap(), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(info_status(&app, old_access).await, StatusCode::UNAUTHORIZED);
    assert_eq!(
        info_status(&app, refreshed["access_token"].as_str().unwrap()).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_refresh_scope_only_narrows() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let refresh_token = tokens["refresh_token"].as_str().unwrap();

    let (_, narrowed) = refresh(&app, &client, refresh_token, Some("read")).await;
    assert_eq!(narrowed["scope"], "read");

    let (_, widened) = refresh(&app, &client, refresh_token, Some("read write admin")).await;
    assert_eq!(widened["scope"], tokens["scope"]);
}

#[tokio::test]
async fn test_refresh_by_other_client_fails() {
    let (app, _resources) = create_test_gateway().await;
    let owner = register_public_client(&app).await;
    let other = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &owner).await;

    let (status, body) = refresh(&app, &other, tokens["refresh_token"].as_str().unwrap(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn test_revoke_access_token_is_idempotent() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let access = tokens["access_token"].as_str().unwrap();

    revoke(&app, access, None).await;
    assert_eq!(info_status(&app, access).await, StatusCode::UNAUTHORIZED);
    revoke(&app, access, None).await;
    revoke(&app, "never-issued", Some("access_token")).await;
}

#[tokio::test]
async fn test_revoke_refresh_token_drops_paired_access_token() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_public_client(&app).await;
    let tokens = obtain_tokens(&app, &client).await;
    let access = tokens["access_token"].as_str().unwrap();
    let refresh_token = tokens["refresh_token"].as_str().unwrap();

    revoke(&app, refresh_token, Some("refresh_token")).await;

    assert_eq!(info_status(&app, access).await, StatusCode::UNAUTHORIZED);
    let (status, body) = refresh(&app, &client, refresh_token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn test_revoke_without_token_still_succeeds() {
    let (app, _resources) = create_test_gateway().await;
    let body: Value = AxumTestRequest::post("/oauth/revoke")
        .raw("application/x-www-form-urlencoded", "")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["status"], "revoked");
}
