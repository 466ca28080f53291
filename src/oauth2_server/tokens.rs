// ABOUTME: Access and refresh token issuance, verification, refresh, and revocation
// ABOUTME: Opaque random bearer tokens whose validity is existence plus expiry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use super::models::{OAuth2Error, TokenResponse};
use super::repository::TokenRepository;
use super::secrets;
use crate::constants::oauth;
use crate::errors::AppResult;
use crate::models::{AccessToken, RefreshToken};

/// What happens to the previously paired access token on refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// The old access token stays valid until its own expiry
    #[default]
    Grace,
    /// The old access token is deleted as soon as the refresh succeeds
    Invalidate,
}

impl FromStr for RefreshPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grace" => Ok(Self::Grace),
            "invalidate" => Ok(Self::Invalidate),
            other => Err(format!("Unknown refresh policy: {other}")),
        }
    }
}

/// RFC 7009 `token_type_hint`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypeHint {
    /// Look in access tokens first
    AccessToken,
    /// Look in refresh tokens first
    RefreshToken,
}

impl TokenTypeHint {
    /// Parse a hint; unknown hints are ignored per RFC 7009 section 2.1
    #[must_use]
    pub fn parse(hint: &str) -> Option<Self> {
        match hint {
            "access_token" => Some(Self::AccessToken),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

/// Claims of a valid access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    /// Client the token was issued to
    pub client_id: String,
    /// Principal the token acts for
    pub user_id: String,
    /// Granted scope
    pub scope: String,
    /// Optional audience indicator
    pub resource: Option<String>,
}

/// Access token and the refresh token paired with it
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Newly issued access token
    pub access: AccessToken,
    /// Refresh token pointing at `access`
    pub refresh: RefreshToken,
}

impl TokenPair {
    /// Token endpoint response body
    #[must_use]
    pub fn into_token_response(self) -> TokenResponse {
        let expires_in = (self.access.expires_at - self.access.created_at).num_seconds();
        TokenResponse {
            access_token: self.access.token,
            token_type: "Bearer".to_owned(),
            expires_in,
            refresh_token: self.refresh.token,
            scope: self.access.scope,
        }
    }
}

/// Token Store
pub struct TokenStore {
    repository: Arc<dyn TokenRepository>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    refresh_policy: RefreshPolicy,
}

impl TokenStore {
    /// Creates a token store
    #[must_use]
    pub fn new(
        repository: Arc<dyn TokenRepository>,
        access_ttl_secs: i64,
        refresh_ttl_days: i64,
        refresh_policy: RefreshPolicy,
    ) -> Self {
        Self {
            repository,
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::days(refresh_ttl_days),
            refresh_policy,
        }
    }

    /// Issue and store a new access token
    ///
    /// # Errors
    /// Returns an error if the RNG or the repository fails
    pub async fn issue_access_token(
        &self,
        client_id: &str,
        user_id: &str,
        scope: &str,
        resource: Option<&str>,
    ) -> AppResult<AccessToken> {
        let now = Utc::now();
        let token = AccessToken {
            token: secrets::generate_random_string(oauth::TOKEN_BYTES)?,
            client_id: client_id.to_owned(),
            user_id: user_id.to_owned(),
            scope: scope.to_owned(),
            resource: resource.map(str::to_owned),
            expires_at: now + self.access_ttl,
            created_at: now,
        };
        self.repository.store_access_token(token.clone()).await?; // Safe: returned to caller
        Ok(token)
    }

    /// Issue and store a new refresh token paired with `access_token_id`
    ///
    /// # Errors
    /// Returns an error if the RNG or the repository fails
    pub async fn issue_refresh_token(
        &self,
        client_id: &str,
        user_id: &str,
        scope: &str,
        access_token_id: &str,
        resource: Option<&str>,
    ) -> AppResult<RefreshToken> {
        let now = Utc::now();
        let token = RefreshToken {
            token: secrets::generate_random_string(oauth::TOKEN_BYTES)?,
            access_token_id: access_token_id.to_owned(),
            client_id: client_id.to_owned(),
            user_id: user_id.to_owned(),
            scope: scope.to_owned(),
            resource: resource.map(str::to_owned),
            expires_at: now + self.refresh_ttl,
            created_at: now,
        };
        self.repository.store_refresh_token(token.clone()).await?; // Safe: returned to caller
        Ok(token)
    }

    /// Issue a fresh access token and a refresh token paired with it
    ///
    /// # Errors
    /// Returns an error if either issuance fails
    pub async fn issue_pair(
        &self,
        client_id: &str,
        user_id: &str,
        scope: &str,
        resource: Option<&str>,
    ) -> AppResult<TokenPair> {
        let access = self
            .issue_access_token(client_id, user_id, scope, resource)
            .await?;
        let refresh = self
            .issue_refresh_token(client_id, user_id, scope, &access.token, resource)
            .await?;
        Ok(TokenPair { access, refresh })
    }

    /// Claims of a live access token, `None` when absent or expired
    ///
    /// # Errors
    /// Returns an error if the repository read fails
    pub async fn verify_access(&self, token: &str) -> AppResult<Option<TokenClaims>> {
        let Some(record) = self.repository.get_access_token(token).await? else {
            return Ok(None);
        };
        if record.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(TokenClaims {
            client_id: record.client_id,
            user_id: record.user_id,
            scope: record.scope,
            resource: record.resource,
        }))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token keeps its value and expiry and is re-pointed at the
    /// new access token. A requested scope is honored only when it is a strict
    /// subset of the original grant.
    ///
    /// # Errors
    /// Returns `invalid_grant` for unknown, expired, or foreign refresh tokens
    /// and `server_error` on storage failure
    pub async fn refresh(
        &self,
        refresh_token: &str,
        client_id: &str,
        requested_scope: Option<&str>,
    ) -> Result<TokenPair, OAuth2Error> {
        let stored = self
            .repository
            .get_refresh_token(refresh_token)
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Refresh token lookup failed");
                OAuth2Error::server_error("Failed to look up refresh token")
            })?
            .ok_or_else(|| OAuth2Error::invalid_grant("Invalid refresh token"))?;

        if stored.client_id != client_id {
            tracing::warn!(client_id = %client_id, "Refresh token presented by a different client");
            return Err(OAuth2Error::invalid_grant("Invalid refresh token"));
        }
        if stored.is_expired(Utc::now()) {
            return Err(OAuth2Error::invalid_grant("Refresh token has expired"));
        }

        let scope = narrowed_scope(&stored.scope, requested_scope);
        let access = self
            .issue_access_token(client_id, &stored.user_id, &scope, stored.resource.as_deref())
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Failed to issue refreshed access token");
                OAuth2Error::server_error("Failed to issue access token")
            })?;

        let previous = self
            .repository
            .repoint_refresh_token(refresh_token, &access.token)
            .await
            .map_err(|e| {
                tracing::error!(client_id = %client_id, error = %e, "Failed to re-point refresh token");
                OAuth2Error::server_error("Failed to update refresh token")
            })?
            .ok_or_else(|| OAuth2Error::invalid_grant("Invalid refresh token"))?;

        if self.refresh_policy == RefreshPolicy::Invalidate {
            if let Err(e) = self.repository.delete_access_token(&previous).await {
                tracing::warn!(client_id = %client_id, error = %e, "Failed to invalidate previous access token");
            }
        }

        tracing::info!(client_id = %client_id, scope = %scope, "Refreshed access token");
        Ok(TokenPair {
            refresh: RefreshToken {
                access_token_id: access.token.clone(), // Safe: pairing shown to caller
                ..stored
            },
            access,
        })
    }

    /// Revoke a token. Unknown and already revoked tokens succeed silently.
    /// Revoking a refresh token also revokes its currently paired access token.
    ///
    /// # Errors
    /// Returns an error only on storage failure
    pub async fn revoke(&self, token: &str, hint: Option<TokenTypeHint>) -> AppResult<()> {
        if hint == Some(TokenTypeHint::RefreshToken) {
            if self.revoke_refresh(token).await? {
                return Ok(());
            }
            self.repository.delete_access_token(token).await?;
            return Ok(());
        }

        if self.repository.delete_access_token(token).await? {
            tracing::debug!("Revoked access token");
            return Ok(());
        }
        self.revoke_refresh(token).await?;
        Ok(())
    }

    async fn revoke_refresh(&self, token: &str) -> AppResult<bool> {
        let Some(removed) = self.repository.delete_refresh_token(token).await? else {
            return Ok(false);
        };
        self.repository
            .delete_access_token(&removed.access_token_id)
            .await?;
        tracing::debug!(client_id = %removed.client_id, "Revoked refresh token and paired access token");
        Ok(true)
    }

    /// Remove expired access and refresh tokens
    ///
    /// # Errors
    /// Returns an error if the repository fails
    pub async fn purge(&self) -> AppResult<usize> {
        self.repository.purge_expired_tokens(Utc::now()).await
    }
}

/// `requested` if it names a strict subset of `original`, otherwise `original`
fn narrowed_scope(original: &str, requested: Option<&str>) -> String {
    let Some(requested) = requested.filter(|s| !s.trim().is_empty()) else {
        return original.to_owned();
    };
    let granted: HashSet<&str> = original.split_whitespace().collect();
    let asked: HashSet<&str> = requested.split_whitespace().collect();
    if asked.is_subset(&granted) && asked.len() < granted.len() {
        requested.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        original.to_owned()
    }
}
