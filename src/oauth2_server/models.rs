// ABOUTME: OAuth 2.1 wire models for registration, authorization, token, and revocation
// ABOUTME: Implements RFC 6749, RFC 7591, RFC 7009, and RFC 8414 request/response structures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// OAuth 2.0 Client Registration Request (RFC 7591)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientRegistrationRequest {
    /// Client name for display
    pub client_name: Option<String>,
    /// Redirect URIs for authorization code flow
    pub redirect_uris: Option<Vec<String>>,
    /// Grant types the client can use
    pub grant_types: Option<Vec<String>>,
    /// `none` registers a public client, anything else a confidential one
    pub token_endpoint_auth_method: Option<String>,
    /// Scopes the client can request
    pub scope: Option<String>,
}

/// OAuth 2.0 Client Registration Response (RFC 7591)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRegistrationResponse {
    /// Unique client identifier
    pub client_id: String,
    /// Plaintext secret, present exactly once and only for confidential clients
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Client name
    pub client_name: String,
    /// Redirect URIs registered for this client
    pub redirect_uris: Vec<String>,
    /// Grant types allowed for this client
    pub grant_types: Vec<String>,
    /// Response types allowed for this client
    pub response_types: Vec<String>,
    /// `none` or `client_secret_post`
    pub token_endpoint_auth_method: String,
    /// Default scope
    pub scope: String,
    /// Registration instant (seconds since epoch)
    pub client_id_issued_at: i64,
    /// `0` when an issued secret never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret_expires_at: Option<i64>,
}

/// OAuth 2.0 Authorization Request
///
/// Every field is optional at the wire level so missing parameters surface
/// as `invalid_request` rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeRequest {
    /// Must be `code`
    pub response_type: Option<String>,
    /// Client identifier
    pub client_id: Option<String>,
    /// Redirect URI, matched exactly
    pub redirect_uri: Option<String>,
    /// Requested scopes
    pub scope: Option<String>,
    /// Opaque value echoed on the redirect
    pub state: Option<String>,
    /// PKCE code challenge (RFC 7636), mandatory
    pub code_challenge: Option<String>,
    /// `S256` (default) or `plain`
    pub code_challenge_method: Option<String>,
    /// Resource indicator (RFC 8707)
    pub resource: Option<String>,
}

/// Successful authorization, delivered as a redirect
#[derive(Debug, Clone)]
pub struct AuthorizeResponse {
    /// Validated redirect target
    pub redirect_uri: String,
    /// Issued authorization code
    pub code: String,
    /// State echoed from the request
    pub state: Option<String>,
}

impl AuthorizeResponse {
    /// Redirect location carrying `code` and `state`
    #[must_use]
    pub fn location(&self) -> String {
        let mut params = vec![("code", self.code.as_str())];
        if let Some(state) = self.state.as_deref() {
            params.push(("state", state));
        }
        append_query(&self.redirect_uri, &params)
    }
}

/// Authorization failure
#[derive(Debug, Clone)]
pub enum AuthorizeError {
    /// The redirect target is trusted, so the error travels back to the client
    Redirect {
        /// Validated redirect target
        redirect_uri: String,
        /// Protocol error
        error: OAuth2Error,
        /// State echoed from the request
        state: Option<String>,
    },
    /// No safe redirect target is known; answer directly
    Direct(OAuth2Error),
}

impl AuthorizeError {
    /// Protocol error regardless of delivery
    #[must_use]
    pub const fn error(&self) -> &OAuth2Error {
        match self {
            Self::Redirect { error, .. } | Self::Direct(error) => error,
        }
    }
}

impl IntoResponse for AuthorizeError {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect {
                redirect_uri,
                error,
                state,
            } => {
                let mut params = vec![("error", error.error.as_str())];
                if let Some(description) = error.error_description.as_deref() {
                    params.push(("error_description", description));
                }
                if let Some(state) = state.as_deref() {
                    params.push(("state", state));
                }
                found(&append_query(&redirect_uri, &params))
            }
            Self::Direct(error) => error.into_response(),
        }
    }
}

impl IntoResponse for AuthorizeResponse {
    fn into_response(self) -> Response {
        found(&self.location())
    }
}

fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => OAuth2Error::server_error("Redirect location is not a valid header value")
            .into_response(),
    }
}

fn append_query(base: &str, params: &[(&str, &str)]) -> String {
    url::Url::parse(base).map_or_else(
        |_| {
            let encoded: Vec<String> = params
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
                .collect();
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}{}", encoded.join("&"))
        },
        |mut url| {
            url.query_pairs_mut().extend_pairs(params.iter());
            url.to_string()
        },
    )
}

/// OAuth 2.0 Token Request (form encoded)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenRequest {
    /// `authorization_code` or `refresh_token`
    pub grant_type: Option<String>,
    /// Client ID
    pub client_id: Option<String>,
    /// Client secret (`client_secret_post`), confidential clients only
    pub client_secret: Option<String>,
    /// Authorization code (for `authorization_code` grant)
    pub code: Option<String>,
    /// Redirect URI, must repeat the one used at authorization
    pub redirect_uri: Option<String>,
    /// PKCE code verifier (for `authorization_code` grant)
    pub code_verifier: Option<String>,
    /// Refresh token (for `refresh_token` grant)
    pub refresh_token: Option<String>,
    /// Narrowed scope (for `refresh_token` grant)
    pub scope: Option<String>,
}

/// OAuth 2.0 Token Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Opaque bearer token
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// Refresh token, stable across refreshes
    pub refresh_token: String,
    /// Granted scope
    pub scope: String,
}

/// OAuth 2.0 Token Revocation Request (RFC 7009)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RevokeRequest {
    /// Token to revoke
    pub token: Option<String>,
    /// `access_token` or `refresh_token`
    pub token_type_hint: Option<String>,
}

/// Authorization server metadata (RFC 8414)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationServerMetadata {
    /// Issuer identifier
    pub issuer: String,
    /// Authorization endpoint
    pub authorization_endpoint: String,
    /// Token endpoint
    pub token_endpoint: String,
    /// Dynamic registration endpoint
    pub registration_endpoint: String,
    /// Revocation endpoint
    pub revocation_endpoint: String,
    /// Always `[code]`
    pub response_types_supported: Vec<String>,
    /// Supported grant types
    pub grant_types_supported: Vec<String>,
    /// Always `[S256]`
    pub code_challenge_methods_supported: Vec<String>,
    /// `none` and `client_secret_post`
    pub token_endpoint_auth_methods_supported: Vec<String>,
    /// Advertised scopes
    pub scopes_supported: Vec<String>,
    /// Human documentation
    pub service_documentation: String,
}

/// Protected resource metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResourceMetadata {
    /// Resource identifier
    pub resource: String,
    /// Authorization servers that issue tokens for this resource
    pub authorization_servers: Vec<String>,
    /// Always `[header]`
    pub bearer_methods_supported: Vec<String>,
    /// Human documentation
    pub resource_documentation: String,
    /// Empty: tokens are opaque
    pub resource_signing_alg_values_supported: Vec<String>,
}

/// OAuth 2.0 Error Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Error {
    /// Error code
    pub error: String,
    /// Human-readable error description
    pub error_description: Option<String>,
    /// URI for error information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

const RFC6749_AUTHZ_ERRORS: &str = "https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.2.1";
const RFC6749_TOKEN_ERRORS: &str = "https://datatracker.ietf.org/doc/html/rfc6749#section-5.2";
const RFC7591_ERRORS: &str = "https://datatracker.ietf.org/doc/html/rfc7591#section-3.2.2";

impl OAuth2Error {
    fn build(error: &str, description: &str, uri: Option<&str>) -> Self {
        Self {
            error: error.to_owned(),
            error_description: Some(description.to_owned()),
            error_uri: uri.map(str::to_owned),
        }
    }

    /// Create an `invalid_request` error
    #[must_use]
    pub fn invalid_request(description: &str) -> Self {
        Self::build("invalid_request", description, Some(RFC6749_AUTHZ_ERRORS))
    }

    /// Create an `invalid_client` error
    #[must_use]
    pub fn invalid_client() -> Self {
        Self::build(
            "invalid_client",
            "Client authentication failed",
            Some(RFC6749_TOKEN_ERRORS),
        )
    }

    /// Create an `invalid_grant` error
    #[must_use]
    pub fn invalid_grant(description: &str) -> Self {
        Self::build("invalid_grant", description, Some(RFC6749_TOKEN_ERRORS))
    }

    /// Create an `unsupported_grant_type` error
    #[must_use]
    pub fn unsupported_grant_type() -> Self {
        Self::build(
            "unsupported_grant_type",
            "Grant type not supported",
            Some(RFC6749_TOKEN_ERRORS),
        )
    }

    /// Create an `unsupported_response_type` error
    #[must_use]
    pub fn unsupported_response_type() -> Self {
        Self::build(
            "unsupported_response_type",
            "Only 'code' response_type is supported",
            Some(RFC6749_AUTHZ_ERRORS),
        )
    }

    /// Create an `unauthorized_client` error (RFC 6749 Section 4.1.2.1)
    /// Used when a client attempts to use a `grant_type` it was not registered for
    #[must_use]
    pub fn unauthorized_client(description: &str) -> Self {
        Self::build("unauthorized_client", description, Some(RFC6749_AUTHZ_ERRORS))
    }

    /// Create an `invalid_client_metadata` error (RFC 7591)
    #[must_use]
    pub fn invalid_client_metadata(description: &str) -> Self {
        Self::build("invalid_client_metadata", description, Some(RFC7591_ERRORS))
    }

    /// Create an `invalid_redirect_uri` error (RFC 7591)
    #[must_use]
    pub fn invalid_redirect_uri(description: &str) -> Self {
        Self::build("invalid_redirect_uri", description, Some(RFC7591_ERRORS))
    }

    /// Create a `server_error` error
    #[must_use]
    pub fn server_error(description: &str) -> Self {
        Self::build("server_error", description, None)
    }

    /// HTTP status for a directly returned error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "invalid_client" => StatusCode::UNAUTHORIZED,
            "server_error" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for OAuth2Error {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CACHE_CONTROL, "no-store")],
            Json(self),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_client_is_401() {
        assert_eq!(
            OAuth2Error::invalid_client().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            OAuth2Error::invalid_grant("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_location_preserves_existing_query() {
        let response = AuthorizeResponse {
            redirect_uri: "https://app.example/cb?tenant=a".to_owned(),
            code: "c0de".to_owned(),
            state: Some("xyz 1".to_owned()),
        };
        let location = response.location();
        let parsed = url::Url::parse(&location).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("tenant".to_owned(), "a".to_owned()),
                ("code".to_owned(), "c0de".to_owned()),
                ("state".to_owned(), "xyz 1".to_owned()),
            ]
        );
    }
}
