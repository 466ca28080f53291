// ABOUTME: OAuth 2.1 client registry with dynamic registration (RFC 7591)
// ABOUTME: Issues client ids and hashed secrets, validates redirect URIs and client credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::Utc;

use super::models::{ClientRegistrationRequest, ClientRegistrationResponse, OAuth2Error};
use super::repository::ClientRepository;
use super::secrets;
use crate::constants::oauth;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{GrantType, OAuth2Client};

/// Parameters for registering a client
#[derive(Debug, Clone)]
pub struct NewClient {
    /// Display name, must not be blank
    pub client_name: String,
    /// Redirect URIs, must not be empty
    pub redirect_uris: Vec<String>,
    /// Grant types, defaults to `authorization_code` and `refresh_token`
    pub grant_types: Option<Vec<GrantType>>,
    /// Public clients get no secret
    pub is_public: bool,
    /// Default scope
    pub scope: Option<String>,
}

/// A freshly registered client and its one-time plaintext secret
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    /// Stored client record
    pub client: OAuth2Client,
    /// Plaintext secret, only for confidential clients
    pub client_secret: Option<String>,
}

/// OAuth 2.1 Client Registry
pub struct ClientRegistry {
    repository: Arc<dyn ClientRepository>,
}

impl ClientRegistry {
    /// Creates a registry over the given repository
    #[must_use]
    pub fn new(repository: Arc<dyn ClientRepository>) -> Self {
        Self { repository }
    }

    /// Register a new client
    ///
    /// # Errors
    /// Returns `invalid_client_metadata` for a blank name, `invalid_redirect_uri`
    /// for empty or unacceptable redirect URIs, and `server_error` when the
    /// secret cannot be generated or the record cannot be stored
    pub async fn register(&self, new_client: NewClient) -> Result<RegisteredClient, OAuth2Error> {
        Self::validate_new_client(&new_client)?;

        let client_id = Self::generate_client_id()?;
        let (client_secret, client_secret_hash) = if new_client.is_public {
            (None, None)
        } else {
            let secret = secrets::generate_random_string(oauth::CLIENT_SECRET_BYTES)
                .map_err(|_| OAuth2Error::server_error("Failed to generate client secret"))?;
            let hash = secrets::hash_client_secret(&secret)
                .map_err(|_| OAuth2Error::server_error("Failed to hash client secret"))?;
            (Some(secret), Some(hash))
        };

        let client = OAuth2Client {
            client_id: client_id.clone(), // Safe: String ownership for client record
            client_name: new_client.client_name.trim().to_owned(),
            client_secret_hash,
            redirect_uris: new_client.redirect_uris,
            grant_types: new_client
                .grant_types
                .unwrap_or_else(|| GrantType::all().to_vec()),
            scope: new_client
                .scope
                .unwrap_or_else(|| oauth::DEFAULT_SCOPE.to_owned()),
            is_active: true,
            created_at: Utc::now(),
        };

        self.repository
            .store_client(client.clone()) // Safe: record returned to caller
            .await
            .map_err(|e| {
                tracing::error!(error = %e, client_id = %client_id, "Failed to store OAuth2 client registration");
                OAuth2Error::server_error("Failed to store client registration")
            })?;

        tracing::info!(
            client_id = %client_id,
            client_name = %client.client_name,
            public = client.is_public(),
            "Registered OAuth2 client"
        );

        Ok(RegisteredClient {
            client,
            client_secret,
        })
    }

    /// Handle an RFC 7591 registration body
    ///
    /// # Errors
    /// Returns the same protocol errors as [`Self::register`], plus
    /// `invalid_client_metadata` for unsupported grant types
    pub async fn register_from_request(
        &self,
        request: ClientRegistrationRequest,
    ) -> Result<ClientRegistrationResponse, OAuth2Error> {
        let client_name = request
            .client_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| OAuth2Error::invalid_client_metadata("client_name is required"))?;

        let grant_types = request
            .grant_types
            .map(|grants| {
                grants
                    .iter()
                    .map(|g| {
                        g.parse::<GrantType>()
                            .map_err(|e| OAuth2Error::invalid_client_metadata(&e))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let is_public =
            request.token_endpoint_auth_method.as_deref() == Some(oauth::AUTH_METHOD_NONE);

        let registered = self
            .register(NewClient {
                client_name,
                redirect_uris: request.redirect_uris.unwrap_or_default(),
                grant_types,
                is_public,
                scope: request.scope,
            })
            .await?;

        let client = registered.client;
        Ok(ClientRegistrationResponse {
            client_secret_expires_at: registered.client_secret.as_ref().map(|_| 0),
            client_secret: registered.client_secret,
            token_endpoint_auth_method: client.token_endpoint_auth_method().to_owned(),
            grant_types: client
                .grant_types
                .iter()
                .map(|g| g.as_str().to_owned())
                .collect(),
            response_types: vec!["code".to_owned()],
            client_id_issued_at: client.created_at.timestamp(),
            client_id: client.client_id,
            client_name: client.client_name,
            redirect_uris: client.redirect_uris,
            scope: client.scope,
        })
    }

    /// Provision a confidential client with a known id and secret at startup.
    /// Re-running with the same id replaces the stored record.
    ///
    /// # Errors
    /// Returns an error if hashing or storage fails
    pub async fn bootstrap_client(
        &self,
        client_id: &str,
        client_secret: &str,
        client_name: &str,
        redirect_uris: &[&str],
    ) -> AppResult<OAuth2Client> {
        let client = OAuth2Client {
            client_id: client_id.to_owned(),
            client_name: client_name.to_owned(),
            client_secret_hash: Some(secrets::hash_client_secret(client_secret)?),
            redirect_uris: redirect_uris.iter().map(|uri| (*uri).to_owned()).collect(),
            grant_types: GrantType::all().to_vec(),
            scope: oauth::DEFAULT_SCOPE.to_owned(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.repository.store_client(client.clone()).await?; // Safe: record returned to caller
        tracing::info!(client_id = %client_id, client_name = %client_name, "Bootstrapped first-party OAuth2 client");
        Ok(client)
    }

    /// Get an active client by id
    ///
    /// # Errors
    /// Returns `not_found` for unknown or deactivated clients
    pub async fn get(&self, client_id: &str) -> AppResult<OAuth2Client> {
        self.repository
            .get_client(client_id)
            .await?
            .filter(|client| client.is_active)
            .ok_or_else(|| AppError::not_found("OAuth2 client"))
    }

    /// Exact-match check of a redirect URI against the client's registered set
    ///
    /// # Errors
    /// Returns `not_found` for unknown or deactivated clients
    pub async fn validate_redirect_uri(&self, client_id: &str, uri: &str) -> AppResult<bool> {
        let client = self.get(client_id).await?;
        Ok(client.redirect_uris.iter().any(|registered| registered == uri))
    }

    /// Verify a presented secret. Always `false` for public or unknown clients.
    ///
    /// # Errors
    /// Returns an error only if the repository read fails
    pub async fn verify_secret(&self, client_id: &str, presented_secret: &str) -> AppResult<bool> {
        let Some(client) = self
            .repository
            .get_client(client_id)
            .await?
            .filter(|client| client.is_active)
        else {
            return Ok(false);
        };
        Ok(client
            .client_secret_hash
            .as_deref()
            .is_some_and(|hash| secrets::verify_client_secret(presented_secret, hash)))
    }

    /// Authenticate a client at the token endpoint (`none` or `client_secret_post`)
    ///
    /// # Errors
    /// Returns `invalid_client` for unknown or inactive clients, and for
    /// confidential clients presenting a missing or wrong secret
    pub async fn authenticate(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<OAuth2Client, OAuth2Error> {
        let client = self.get(client_id).await.map_err(|e| {
            tracing::warn!(client_id = %client_id, error = %e, "OAuth client lookup failed");
            OAuth2Error::invalid_client()
        })?;

        if let Some(hash) = client.client_secret_hash.as_deref() {
            let presented = client_secret.ok_or_else(OAuth2Error::invalid_client)?;
            if !secrets::verify_client_secret(presented, hash) {
                AppLogger::log_security_event(
                    "client_secret_mismatch",
                    "medium",
                    &format!("client_id={client_id}"),
                );
                return Err(OAuth2Error::invalid_client());
            }
        }

        Ok(client)
    }

    /// Soft-delete a client; existing tokens stay valid until expiry
    ///
    /// # Errors
    /// Returns `not_found` for unknown clients
    pub async fn deactivate(&self, client_id: &str) -> AppResult<()> {
        if self.repository.set_client_active(client_id, false).await? {
            tracing::info!(client_id = %client_id, "Deactivated OAuth2 client");
            Ok(())
        } else {
            Err(AppError::not_found("OAuth2 client"))
        }
    }

    fn validate_new_client(new_client: &NewClient) -> Result<(), OAuth2Error> {
        if new_client.client_name.trim().is_empty() {
            return Err(OAuth2Error::invalid_client_metadata("client_name is required"));
        }

        if new_client.redirect_uris.is_empty() {
            return Err(OAuth2Error::invalid_redirect_uri(
                "At least one redirect_uri is required",
            ));
        }

        for uri in &new_client.redirect_uris {
            if !is_valid_redirect_uri(uri) {
                return Err(OAuth2Error::invalid_redirect_uri(&format!(
                    "Invalid redirect_uri: {uri}"
                )));
            }
        }

        Ok(())
    }

    fn generate_client_id() -> Result<String, OAuth2Error> {
        secrets::generate_hex_string(oauth::CLIENT_ID_BYTES)
            .map(|random| format!("{}{random}", oauth::CLIENT_ID_PREFIX))
            .map_err(|_| OAuth2Error::server_error("Failed to generate client id"))
    }
}

/// Redirect URI acceptance rules (RFC 6749 section 3.1.2, RFC 8252)
///
/// - absolute URI without fragment or wildcard
/// - `https`, or `http` on a loopback host
#[must_use]
pub fn is_valid_redirect_uri(uri: &str) -> bool {
    if uri.trim().is_empty() {
        return false;
    }

    if uri.contains('#') {
        tracing::warn!("Rejected redirect_uri with fragment: {}", uri);
        return false;
    }

    if uri.contains('*') {
        tracing::warn!("Rejected redirect_uri with wildcard: {}", uri);
        return false;
    }

    let Ok(parsed_uri) = url::Url::parse(uri) else {
        tracing::warn!("Rejected malformed redirect_uri: {}", uri);
        return false;
    };

    let is_loopback = matches!(
        parsed_uri.host_str(),
        Some("localhost" | "127.0.0.1" | "[::1]")
    );

    match parsed_uri.scheme() {
        "https" => true,
        "http" if is_loopback => true,
        _ => {
            tracing::warn!(
                "Rejected redirect_uri with non-HTTPS scheme for non-loopback host: {}",
                uri
            );
            false
        }
    }
}
