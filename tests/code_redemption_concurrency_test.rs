// ABOUTME: Concurrency tests for authorization code redemption
// ABOUTME: Many simultaneous exchanges of one code must yield exactly one token pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    authorize, code_exchange_form, create_test_gateway, register_public_client, test_config,
    REDIRECT_URI, VERIFIER,
};
use helpers::axum_test::AxumTestRequest;
use mcp_gateway::oauth2_server::{
    secrets::s256_challenge, AuthorizeRequest, OAuth2AuthorizationServer, TokenRequest,
};

const ATTEMPTS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_http_redemptions_issue_one_pair() {
    let (app, _resources) = create_test_gateway().await;
    let client = register_public_client(&app).await;
    let code = authorize(&app, &client, VERIFIER).await;
    let form = code_exchange_form(&client, &code, VERIFIER);

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let app = app.clone();
            let form = form.clone();
            tokio::spawn(async move {
                AxumTestRequest::post("/oauth/token")
                    .form(&form)
                    .send(app)
                    .await
                    .status_code()
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => successes += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_direct_redemptions_issue_one_pair() {
    common::init_test_logging();
    let server = Arc::new(OAuth2AuthorizationServer::in_memory(
        test_config().oauth_settings(),
    ));
    let registered = server
        .clients()
        .register(mcp_gateway::oauth2_server::NewClient {
            client_name: "Racer".to_owned(),
            redirect_uris: vec![REDIRECT_URI.to_owned()],
            grant_types: None,
            is_public: true,
            scope: None,
        })
        .await
        .unwrap();
    let client_id = registered.client.client_id;

    let issued = server
        .authorize(AuthorizeRequest {
            response_type: Some("code".to_owned()),
            client_id: Some(client_id.clone()),
            redirect_uri: Some(REDIRECT_URI.to_owned()),
            scope: None,
            state: None,
            code_challenge: Some(s256_challenge(VERIFIER)),
            code_challenge_method: Some("S256".to_owned()),
            resource: None,
        })
        .await
        .unwrap();

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|_| {
            let server = Arc::clone(&server);
            let request = TokenRequest {
                grant_type: Some("authorization_code".to_owned()),
                client_id: Some(client_id.clone()),
                client_secret: None,
                code: Some(issued.code.clone()),
                redirect_uri: Some(REDIRECT_URI.to_owned()),
                code_verifier: Some(VERIFIER.to_owned()),
                refresh_token: None,
                scope: None,
            };
            tokio::spawn(async move { server.token(request).await })
        })
        .collect();

    let mut issued_tokens = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(response) => issued_tokens.push(response.access_token),
            Err(error) => assert_eq!(error.error, "invalid_grant"),
        }
    }
    assert_eq!(issued_tokens.len(), 1);
}
