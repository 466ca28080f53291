// ABOUTME: Bearer authentication shared by every transport: static secret or OAuth access token
// ABOUTME: Produces a principal and the WWW-Authenticate challenge for unauthenticated requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::constants::paths;
use crate::errors::ErrorCode;
use crate::logging::AppLogger;
use crate::oauth2_server::secrets::constant_time_eq;
use crate::oauth2_server::{TokenClaims, TokenStore};

/// Outcome of bearer authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// No usable credential was presented
    Anonymous,
    /// The configured static shared secret
    Static,
    /// A live OAuth access token
    OAuth(TokenClaims),
}

impl Principal {
    /// Whether the request may reach protected resources
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Short identity for logs
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_owned(),
            Self::Static => "static".to_owned(),
            Self::OAuth(claims) => format!("oauth:{}", claims.client_id),
        }
    }
}

/// Middleware for bearer authentication across transports
pub struct BearerAuthenticator {
    static_token: String,
    tokens: Arc<TokenStore>,
}

impl BearerAuthenticator {
    /// Create a new authenticator
    #[must_use]
    pub fn new(static_token: impl Into<String>, tokens: Arc<TokenStore>) -> Self {
        Self {
            static_token: static_token.into(),
            tokens,
        }
    }

    /// Authenticate a presented credential.
    ///
    /// Order: constant-time static secret comparison, then OAuth access token
    /// lookup, then anonymous. Token store failures degrade to anonymous.
    pub async fn authenticate(&self, presented: Option<&str>) -> Principal {
        let Some(token) = presented.map(str::trim).filter(|t| !t.is_empty()) else {
            return Principal::Anonymous;
        };

        if self.matches_static(token) {
            return Principal::Static;
        }

        match self.tokens.verify_access(token).await {
            Ok(Some(claims)) => Principal::OAuth(claims),
            Ok(None) => Principal::Anonymous,
            Err(e) => {
                tracing::error!(error = %e, "Access token verification failed");
                Principal::Anonymous
            }
        }
    }

    /// Authenticate from the `Authorization: Bearer` header
    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> Principal {
        self.authenticate(extract_bearer(headers)).await
    }

    /// Authenticate a `token` query parameter; only the static secret is accepted
    #[must_use]
    pub fn authenticate_query_token(&self, token: Option<&str>) -> Principal {
        match token {
            Some(token) if self.matches_static(token) => Principal::Static,
            _ => Principal::Anonymous,
        }
    }

    /// Require an authenticated principal from request headers
    ///
    /// # Errors
    /// Returns a challenge response when the request is anonymous
    pub async fn require(
        &self,
        headers: &HeaderMap,
        base_url: &str,
        transport: &str,
    ) -> Result<Principal, AuthChallenge> {
        let principal = self.authenticate_headers(headers).await;
        AppLogger::log_auth_event(&principal.label(), transport, principal.is_authenticated());
        if principal.is_authenticated() {
            Ok(principal)
        } else {
            Err(AuthChallenge::new(base_url))
        }
    }

    fn matches_static(&self, token: &str) -> bool {
        !self.static_token.is_empty() && constant_time_eq(token, &self.static_token)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
#[must_use]
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

/// Externally visible base URL: the configured one, or `x-forwarded-proto` plus `Host`
#[must_use]
pub fn resolve_base_url(public_base_url: Option<&str>, headers: &HeaderMap, port: u16) -> String {
    if let Some(base) = public_base_url {
        return base.trim_end_matches('/').to_owned();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map_or("http", str::trim);
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| format!("localhost:{port}"), str::to_owned);

    format!("{scheme}://{host}")
}

/// 401 response pointing OAuth-capable clients at the protected resource metadata
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    base_url: String,
}

impl AuthChallenge {
    /// Challenge for a server reachable at `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
        }
    }

    /// `WWW-Authenticate` header value
    #[must_use]
    pub fn www_authenticate(&self) -> String {
        format!(
            "Bearer realm=\"{base}\", resource=\"{base}{path}\"",
            base = self.base_url,
            path = paths::PROTECTED_RESOURCE_METADATA
        )
    }
}

impl IntoResponse for AuthChallenge {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": ErrorCode::Unauthorized.as_str(),
            "message": "Valid bearer token required",
            "resource_metadata": format!("{}{}", self.base_url, paths::PROTECTED_RESOURCE_METADATA),
        }));
        match HeaderValue::from_str(&self.www_authenticate()) {
            Ok(challenge) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, challenge)],
                body,
            )
                .into_response(),
            Err(_) => (StatusCode::UNAUTHORIZED, body).into_response(),
        }
    }
}
