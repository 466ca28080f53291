// ABOUTME: OAuth 2.1 authorization server: authorize, token, revoke, register, and discovery
// ABOUTME: Owns the state transitions across the client registry, code store, and token store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::auth_codes::{AuthorizationCodeStore, CodeExchange, CodeGrant};
use super::client_registration::ClientRegistry;
use super::memory::InMemoryOAuthStore;
use super::models::{
    AuthorizationServerMetadata, AuthorizeError, AuthorizeRequest, AuthorizeResponse,
    ClientRegistrationRequest, ClientRegistrationResponse, OAuth2Error,
    ProtectedResourceMetadata, RevokeRequest, TokenRequest, TokenResponse,
};
use super::tokens::{RefreshPolicy, TokenStore, TokenTypeHint};
use crate::constants::{oauth, paths};
use crate::logging::AppLogger;
use crate::models::{CodeChallengeMethod, GrantType, OAuth2Client};

/// Tunables of the authorization server
#[derive(Debug, Clone)]
pub struct OAuth2ServerSettings {
    /// Principal recorded on auto-approved authorizations
    pub default_user_id: String,
    /// Scope used when neither request nor client names one
    pub default_scope: String,
    /// Authorization code lifetime
    pub code_ttl_secs: i64,
    /// Access token lifetime
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime
    pub refresh_token_ttl_days: i64,
    /// Fate of the old access token on refresh
    pub refresh_policy: RefreshPolicy,
}

impl Default for OAuth2ServerSettings {
    fn default() -> Self {
        Self {
            default_user_id: oauth::DEFAULT_USER_ID.to_owned(),
            default_scope: oauth::DEFAULT_SCOPE.to_owned(),
            code_ttl_secs: oauth::AUTH_CODE_TTL_SECS,
            access_token_ttl_secs: oauth::ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_days: oauth::REFRESH_TOKEN_TTL_DAYS,
            refresh_policy: RefreshPolicy::Grace,
        }
    }
}

/// OAuth 2.1 Authorization Server
pub struct OAuth2AuthorizationServer {
    clients: ClientRegistry,
    codes: AuthorizationCodeStore,
    tokens: Arc<TokenStore>,
    settings: OAuth2ServerSettings,
}

impl OAuth2AuthorizationServer {
    /// Assemble the server from its three stores
    #[must_use]
    pub fn new(
        clients: ClientRegistry,
        codes: AuthorizationCodeStore,
        tokens: Arc<TokenStore>,
        settings: OAuth2ServerSettings,
    ) -> Self {
        Self {
            clients,
            codes,
            tokens,
            settings,
        }
    }

    /// Server with every repository backed by one in-memory store
    #[must_use]
    pub fn in_memory(settings: OAuth2ServerSettings) -> Self {
        let store = Arc::new(InMemoryOAuthStore::new());
        Self::new(
            ClientRegistry::new(store.clone()), // Safe: Arc clone for shared backend
            AuthorizationCodeStore::new(store.clone(), settings.code_ttl_secs), // Safe: Arc clone for shared backend
            Arc::new(TokenStore::new(
                store,
                settings.access_token_ttl_secs,
                settings.refresh_token_ttl_days,
                settings.refresh_policy,
            )),
            settings,
        )
    }

    /// Client registry
    #[must_use]
    pub const fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// Token store, shared with the bearer authenticator
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Authorization code store
    #[must_use]
    pub const fn codes(&self) -> &AuthorizationCodeStore {
        &self.codes
    }

    /// RFC 8414 discovery document
    #[must_use]
    pub fn metadata(&self, base_url: &str) -> AuthorizationServerMetadata {
        AuthorizationServerMetadata {
            issuer: base_url.to_owned(),
            authorization_endpoint: format!("{base_url}{}", paths::AUTHORIZE),
            token_endpoint: format!("{base_url}{}", paths::TOKEN),
            registration_endpoint: format!("{base_url}{}", paths::REGISTER),
            revocation_endpoint: format!("{base_url}{}", paths::REVOKE),
            response_types_supported: vec!["code".to_owned()],
            grant_types_supported: GrantType::all()
                .iter()
                .map(|g| g.as_str().to_owned())
                .collect(),
            code_challenge_methods_supported: vec![CodeChallengeMethod::S256.as_str().to_owned()],
            token_endpoint_auth_methods_supported: vec![
                oauth::AUTH_METHOD_NONE.to_owned(),
                oauth::AUTH_METHOD_CLIENT_SECRET_POST.to_owned(),
            ],
            scopes_supported: oauth::SUPPORTED_SCOPES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            service_documentation: format!("{base_url}{}", paths::DOCS),
        }
    }

    /// Protected resource metadata naming this server
    #[must_use]
    pub fn protected_resource_metadata(&self, base_url: &str) -> ProtectedResourceMetadata {
        ProtectedResourceMetadata {
            resource: base_url.to_owned(),
            authorization_servers: vec![base_url.to_owned()],
            bearer_methods_supported: vec!["header".to_owned()],
            resource_documentation: format!("{base_url}{}", paths::DOCS),
            resource_signing_alg_values_supported: Vec::new(),
        }
    }

    /// Handle authorization request (GET /oauth/authorize)
    ///
    /// Consent is auto-approved on behalf of the configured default user.
    ///
    /// # Errors
    /// Client and redirect URI failures are returned directly; everything
    /// detected after the redirect URI is trusted travels back as a redirect
    pub async fn authorize(
        &self,
        request: AuthorizeRequest,
    ) -> Result<AuthorizeResponse, AuthorizeError> {
        let client = self.authorize_client(&request).await?;
        let redirect_uri = Self::authorize_redirect_uri(&client, &request)?;

        let redirect_error = |error: OAuth2Error| AuthorizeError::Redirect {
            redirect_uri: redirect_uri.clone(), // Safe: each error carries its own target
            error,
            state: request.state.clone(), // Safe: each error carries its own state
        };

        if request.response_type.as_deref() != Some("code") {
            return Err(redirect_error(OAuth2Error::unsupported_response_type()));
        }

        let Some(code_challenge) = request
            .code_challenge
            .as_deref()
            .filter(|challenge| !challenge.is_empty())
        else {
            return Err(redirect_error(OAuth2Error::invalid_request(
                "code_challenge is required (PKCE)",
            )));
        };

        let code_challenge_method = match request.code_challenge_method.as_deref() {
            None => CodeChallengeMethod::S256,
            Some(method) => method
                .parse::<CodeChallengeMethod>()
                .map_err(|e| redirect_error(OAuth2Error::invalid_request(&e)))?,
        };

        if !client.allows_grant(GrantType::AuthorizationCode) {
            return Err(redirect_error(OAuth2Error::unauthorized_client(
                "Client is not registered for the authorization_code grant",
            )));
        }

        let scope = request
            .scope
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| client.scope.clone(), str::to_owned); // Safe: owned scope for code record

        tracing::info!(
            client_id = %client.client_id,
            user_id = %self.settings.default_user_id,
            scope = %scope,
            "Auto-approving authorization request"
        );

        let code = self
            .codes
            .issue(CodeGrant {
                client_id: client.client_id.clone(), // Safe: String ownership for code record
                redirect_uri: redirect_uri.clone(),  // Safe: String ownership for code record
                scope,
                code_challenge: code_challenge.to_owned(),
                code_challenge_method,
                resource: request.resource.clone(), // Safe: Option<String> ownership for code record
                user_id: self.settings.default_user_id.clone(), // Safe: String ownership for code record
            })
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client.client_id, error = %e, "Failed to issue authorization code");
                redirect_error(OAuth2Error::server_error("Failed to issue authorization code"))
            })?;

        Ok(AuthorizeResponse {
            redirect_uri,
            code,
            state: request.state,
        })
    }

    async fn authorize_client(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<OAuth2Client, AuthorizeError> {
        let client_id = request
            .client_id
            .as_deref()
            .ok_or_else(|| AuthorizeError::Direct(OAuth2Error::invalid_request("Missing client_id")))?;

        self.clients.get(client_id).await.map_err(|e| {
            tracing::warn!(client_id = %client_id, error = %e, "Authorization for unknown client");
            AuthorizeError::Direct(OAuth2Error::invalid_client())
        })
    }

    fn authorize_redirect_uri(
        client: &OAuth2Client,
        request: &AuthorizeRequest,
    ) -> Result<String, AuthorizeError> {
        let redirect_uri = request.redirect_uri.as_deref().ok_or_else(|| {
            AuthorizeError::Direct(OAuth2Error::invalid_request("Missing redirect_uri"))
        })?;

        if client.redirect_uris.iter().any(|uri| uri == redirect_uri) {
            Ok(redirect_uri.to_owned())
        } else {
            AppLogger::log_security_event(
                "unregistered_redirect_uri",
                "high",
                &format!("client_id={} redirect_uri={redirect_uri}", client.client_id),
            );
            Err(AuthorizeError::Direct(OAuth2Error::invalid_request(
                "Invalid redirect_uri",
            )))
        }
    }

    /// Handle token request (POST /oauth/token)
    ///
    /// # Errors
    /// `invalid_client` when the client cannot be authenticated, otherwise
    /// the grant-specific protocol errors
    pub async fn token(&self, request: TokenRequest) -> Result<TokenResponse, OAuth2Error> {
        let client_id = request
            .client_id
            .as_deref()
            .ok_or_else(OAuth2Error::invalid_client)?;
        let client = self
            .clients
            .authenticate(client_id, request.client_secret.as_deref())
            .await?;

        let grant_type = request
            .grant_type
            .as_deref()
            .ok_or_else(|| OAuth2Error::invalid_request("Missing grant_type"))?
            .parse::<GrantType>()
            .map_err(|_| OAuth2Error::unsupported_grant_type())?;

        if !client.allows_grant(grant_type) {
            return Err(OAuth2Error::unauthorized_client(&format!(
                "Client is not registered for the {grant_type} grant"
            )));
        }

        let pair = match grant_type {
            GrantType::AuthorizationCode => {
                self.handle_authorization_code_grant(&client, &request)
                    .await?
            }
            GrantType::RefreshToken => self.handle_refresh_token_grant(&client, &request).await?,
        };

        tracing::info!(client_id = %client.client_id, grant_type = %grant_type, "Issued tokens");
        Ok(pair.into_token_response())
    }

    async fn handle_authorization_code_grant(
        &self,
        client: &OAuth2Client,
        request: &TokenRequest,
    ) -> Result<super::tokens::TokenPair, OAuth2Error> {
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| OAuth2Error::invalid_request("Missing authorization code"))?;
        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .ok_or_else(|| OAuth2Error::invalid_request("Missing redirect_uri"))?;
        let code_verifier = request
            .code_verifier
            .as_deref()
            .ok_or_else(|| OAuth2Error::invalid_request("Missing code_verifier"))?;

        self.codes
            .redeem(
                CodeExchange {
                    code,
                    client_id: &client.client_id,
                    redirect_uri,
                    code_verifier,
                },
                &self.tokens,
            )
            .await
    }

    async fn handle_refresh_token_grant(
        &self,
        client: &OAuth2Client,
        request: &TokenRequest,
    ) -> Result<super::tokens::TokenPair, OAuth2Error> {
        let refresh_token = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| OAuth2Error::invalid_request("Missing refresh_token"))?;

        self.tokens
            .refresh(refresh_token, &client.client_id, request.scope.as_deref())
            .await
    }

    /// Handle revocation (POST /oauth/revoke). Always succeeds from the
    /// client's point of view; storage failures are logged.
    pub async fn revoke(&self, request: RevokeRequest) {
        let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) else {
            tracing::debug!("Revocation request without token");
            return;
        };
        let hint = request
            .token_type_hint
            .as_deref()
            .and_then(TokenTypeHint::parse);

        if let Err(e) = self.tokens.revoke(token, hint).await {
            tracing::error!(error = %e, "Token revocation failed");
        }
    }

    /// Handle dynamic client registration (POST /oauth/register)
    ///
    /// # Errors
    /// Returns `invalid_client_metadata` or `invalid_redirect_uri` for bad metadata
    pub async fn register_client(
        &self,
        request: ClientRegistrationRequest,
    ) -> Result<ClientRegistrationResponse, OAuth2Error> {
        self.clients.register_from_request(request).await
    }

    /// Purge expired codes and tokens, returning how many records were removed
    pub async fn purge_expired(&self) -> usize {
        let codes = self.codes.purge().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Authorization code purge failed");
            0
        });
        let tokens = self.tokens.purge().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Token purge failed");
            0
        });
        codes + tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth2_server::secrets::s256_challenge;

    async fn server_with_client() -> (OAuth2AuthorizationServer, String) {
        let server = OAuth2AuthorizationServer::in_memory(OAuth2ServerSettings::default());
        let registered = server
            .register_client(ClientRegistrationRequest {
                client_name: Some("Test".to_owned()),
                redirect_uris: Some(vec!["https://app.example/cb".to_owned()]),
                token_endpoint_auth_method: Some("none".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();
        (server, registered.client_id)
    }

    fn authorize_request(client_id: &str) -> AuthorizeRequest {
        AuthorizeRequest {
            response_type: Some("code".to_owned()),
            client_id: Some(client_id.to_owned()),
            redirect_uri: Some("https://app.example/cb".to_owned()),
            state: Some("st".to_owned()),
            code_challenge: Some(s256_challenge("verifier123")),
            code_challenge_method: Some("S256".to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_challenge_redirects_invalid_request() {
        let (server, client_id) = server_with_client().await;
        let mut request = authorize_request(&client_id);
        request.code_challenge = None;

        match server.authorize(request).await.unwrap_err() {
            AuthorizeError::Redirect { error, state, .. } => {
                assert_eq!(error.error, "invalid_request");
                assert_eq!(state.as_deref(), Some("st"));
            }
            AuthorizeError::Direct(error) => panic!("expected redirect, got {error:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_redirect_is_direct_error() {
        let (server, client_id) = server_with_client().await;
        let mut request = authorize_request(&client_id);
        request.redirect_uri = Some("https://evil.example/cb".to_owned());
        assert!(matches!(
            server.authorize(request).await.unwrap_err(),
            AuthorizeError::Direct(_)
        ));
    }

    #[tokio::test]
    async fn test_unsupported_response_type() {
        let (server, client_id) = server_with_client().await;
        let mut request = authorize_request(&client_id);
        request.response_type = Some("token".to_owned());
        assert_eq!(
            server.authorize(request).await.unwrap_err().error().error,
            "unsupported_response_type"
        );
    }

    #[tokio::test]
    async fn test_unknown_grant_type() {
        let (server, client_id) = server_with_client().await;
        let err = server
            .token(TokenRequest {
                grant_type: Some("client_credentials".to_owned()),
                client_id: Some(client_id),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.error, "unsupported_grant_type");
    }

    #[tokio::test]
    async fn test_unknown_client_at_token_endpoint() {
        let (server, _) = server_with_client().await;
        let err = server
            .token(TokenRequest {
                grant_type: Some("authorization_code".to_owned()),
                client_id: Some("mcp_nobody".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.error, "invalid_client");
    }

    #[test]
    fn test_metadata_advertises_s256_only() {
        let server = OAuth2AuthorizationServer::in_memory(OAuth2ServerSettings::default());
        let metadata = server.metadata("https://gw.example");
        assert_eq!(metadata.code_challenge_methods_supported, vec!["S256"]);
        assert_eq!(metadata.token_endpoint, "https://gw.example/oauth/token");
        assert_eq!(metadata.issuer, "https://gw.example");
    }
}
