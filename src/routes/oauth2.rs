// ABOUTME: OAuth 2.1 authorization server route handlers and discovery documents
// ABOUTME: Mounts /oauth/* endpoints, their root aliases, and the two well-known metadata documents
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! OAuth 2.1 server routes
//!
//! Protocol failures are rendered by [`OAuth2Error`] so every error body
//! carries `error` and `error_description`. Extractor rejections are mapped
//! onto the same shape instead of axum's plain-text defaults.

use std::sync::Arc;

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::constants::paths;
use crate::mcp::resources::ServerResources;
use crate::oauth2_server::{
    AuthorizeRequest, ClientRegistrationRequest, OAuth2Error, RevokeRequest, TokenRequest,
};

/// `OAuth2` routes implementation
pub struct OAuth2Routes;

impl OAuth2Routes {
    /// Create all `OAuth2` routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::AUTH_SERVER_METADATA, get(Self::handle_metadata))
            .route(
                paths::PROTECTED_RESOURCE_METADATA,
                get(Self::handle_protected_resource_metadata),
            )
            .route(paths::AUTHORIZE, get(Self::handle_authorize))
            .route("/authorize", get(Self::handle_authorize))
            .route(paths::TOKEN, post(Self::handle_token))
            .route("/token", post(Self::handle_token))
            .route(paths::REGISTER, post(Self::handle_register))
            .route("/register", post(Self::handle_register))
            .route(paths::REVOKE, post(Self::handle_revoke))
            .route("/revoke", post(Self::handle_revoke))
            .with_state(resources)
    }

    /// RFC 8414 authorization server metadata
    async fn handle_metadata(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let base_url = resources.base_url(&headers);
        Json(resources.oauth.metadata(&base_url)).into_response()
    }

    /// Protected resource metadata naming this server as the authorization server
    async fn handle_protected_resource_metadata(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let base_url = resources.base_url(&headers);
        Json(resources.oauth.protected_resource_metadata(&base_url)).into_response()
    }

    /// Handle `GET /oauth/authorize`
    async fn handle_authorize(
        State(resources): State<Arc<ServerResources>>,
        query: Result<Query<AuthorizeRequest>, QueryRejection>,
    ) -> Response {
        let Query(request) = match query {
            Ok(query) => query,
            Err(rejection) => {
                return OAuth2Error::invalid_request(&rejection.body_text()).into_response()
            }
        };

        match resources.oauth.authorize(request).await {
            Ok(granted) => granted.into_response(),
            Err(e) => {
                tracing::info!(error = %e.error().error, "Authorization request rejected");
                e.into_response()
            }
        }
    }

    /// Handle `POST /oauth/token`
    async fn handle_token(
        State(resources): State<Arc<ServerResources>>,
        form: Result<Form<TokenRequest>, FormRejection>,
    ) -> Response {
        let Form(request) = match form {
            Ok(form) => form,
            Err(rejection) => {
                return OAuth2Error::invalid_request(&rejection.body_text()).into_response()
            }
        };

        let grant_type = request.grant_type.clone().unwrap_or_default(); // Safe: kept for logging after the request moves
        match resources.oauth.token(request).await {
            Ok(tokens) => (
                [
                    (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
                    (header::PRAGMA, HeaderValue::from_static("no-cache")),
                ],
                Json(tokens),
            )
                .into_response(),
            Err(e) => {
                tracing::info!(grant_type = %grant_type, error = %e.error, "Token request rejected");
                e.into_response()
            }
        }
    }

    /// Handle `POST /oauth/register` (RFC 7591)
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        body: Result<Json<ClientRegistrationRequest>, JsonRejection>,
    ) -> Response {
        let Json(request) = match body {
            Ok(body) => body,
            Err(rejection) => {
                return OAuth2Error::invalid_client_metadata(&rejection.body_text())
                    .into_response()
            }
        };

        match resources.oauth.register_client(request).await {
            Ok(registered) => (StatusCode::CREATED, Json(registered)).into_response(),
            Err(e) => {
                tracing::info!(error = %e.error, "Client registration rejected");
                e.into_response()
            }
        }
    }

    /// Handle `POST /oauth/revoke` (RFC 7009); always 200
    async fn handle_revoke(
        State(resources): State<Arc<ServerResources>>,
        form: Result<Form<RevokeRequest>, FormRejection>,
    ) -> Response {
        let request = form.map(|Form(request)| request).unwrap_or_default();
        resources.oauth.revoke(request).await;
        Json(json!({ "status": "revoked" })).into_response()
    }
}
