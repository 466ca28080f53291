// ABOUTME: Authorization code issuance and single-use redemption with PKCE verification
// ABOUTME: Redemption is linearizable per code and yields exactly one token pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::models::OAuth2Error;
use super::repository::{AuthCodeRepository, CodeRejection};
use super::secrets;
use super::tokens::{TokenPair, TokenStore};
use crate::constants::oauth;
use crate::errors::AppResult;
use crate::models::{AuthorizationCode, CodeChallengeMethod};

/// Parameters bound into an authorization code
#[derive(Debug, Clone)]
pub struct CodeGrant {
    /// Requesting client
    pub client_id: String,
    /// Validated redirect URI
    pub redirect_uri: String,
    /// Granted scope
    pub scope: String,
    /// PKCE challenge
    pub code_challenge: String,
    /// PKCE method
    pub code_challenge_method: CodeChallengeMethod,
    /// Optional resource indicator
    pub resource: Option<String>,
    /// Consenting principal
    pub user_id: String,
}

/// Parameters presented at the token endpoint
#[derive(Debug, Clone, Copy)]
pub struct CodeExchange<'a> {
    /// Code value
    pub code: &'a str,
    /// Authenticated client
    pub client_id: &'a str,
    /// Must equal the redirect URI bound at issuance
    pub redirect_uri: &'a str,
    /// PKCE verifier
    pub code_verifier: &'a str,
}

/// Short-lived, single-use authorization codes
pub struct AuthorizationCodeStore {
    repository: Arc<dyn AuthCodeRepository>,
    ttl: Duration,
}

impl AuthorizationCodeStore {
    /// Creates a store issuing codes that live for `ttl_secs`
    #[must_use]
    pub fn new(repository: Arc<dyn AuthCodeRepository>, ttl_secs: i64) -> Self {
        Self {
            repository,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a new code; its expiry is fixed now
    ///
    /// # Errors
    /// Returns an error if the RNG or the repository fails
    pub async fn issue(&self, grant: CodeGrant) -> AppResult<String> {
        let code = secrets::generate_random_string(oauth::AUTH_CODE_BYTES)?;
        let client_id = grant.client_id.clone(); // Safe: retained for logging

        self.repository
            .store_auth_code(AuthorizationCode {
                code: code.clone(), // Safe: returned to caller
                client_id: grant.client_id,
                user_id: grant.user_id,
                redirect_uri: grant.redirect_uri,
                scope: grant.scope,
                code_challenge: grant.code_challenge,
                code_challenge_method: grant.code_challenge_method,
                resource: grant.resource,
                expires_at: Utc::now() + self.ttl,
                used: false,
            })
            .await?;

        tracing::debug!(client_id = %client_id, "Issued authorization code");
        Ok(code)
    }

    /// Redeem a code for a fresh access and refresh token pair.
    ///
    /// The used flag flips only if client, redirect URI, expiry, and PKCE all
    /// check out, and it flips at most once, so a code never yields two pairs.
    /// A wrong verifier leaves the code redeemable until it expires.
    ///
    /// # Errors
    /// Every rejection maps to `invalid_grant`; storage failures map to `server_error`
    pub async fn redeem(
        &self,
        exchange: CodeExchange<'_>,
        tokens: &TokenStore,
    ) -> Result<TokenPair, OAuth2Error> {
        let check = |stored: &AuthorizationCode| verify_exchange(stored, &exchange);

        let redeemed = self
            .repository
            .consume_auth_code(exchange.code, Utc::now(), &check)
            .await
            .map_err(|e| {
                tracing::error!(client_id = %exchange.client_id, error = %e, "Authorization code lookup failed");
                OAuth2Error::server_error("Failed to consume authorization code")
            })?
            .map_err(|rejection| {
                tracing::warn!(
                    client_id = %exchange.client_id,
                    reason = %rejection,
                    "Authorization code rejected"
                );
                OAuth2Error::invalid_grant(rejection.description())
            })?;

        tokens
            .issue_pair(
                &redeemed.client_id,
                &redeemed.user_id,
                &redeemed.scope,
                redeemed.resource.as_deref(),
            )
            .await
            .map_err(|e| {
                tracing::error!(client_id = %redeemed.client_id, error = %e, "Failed to issue tokens for redeemed code");
                OAuth2Error::server_error("Failed to issue tokens")
            })
    }

    /// Remove expired and used codes
    ///
    /// # Errors
    /// Returns an error if the repository fails
    pub async fn purge(&self) -> AppResult<usize> {
        self.repository.purge_auth_codes(Utc::now()).await
    }
}

fn verify_exchange(
    stored: &AuthorizationCode,
    exchange: &CodeExchange<'_>,
) -> Result<(), CodeRejection> {
    if stored.client_id != exchange.client_id {
        return Err(CodeRejection::ClientMismatch);
    }
    if stored.redirect_uri != exchange.redirect_uri {
        return Err(CodeRejection::RedirectUriMismatch);
    }
    if !secrets::verify_pkce(
        exchange.code_verifier,
        &stored.code_challenge,
        stored.code_challenge_method,
    ) {
        return Err(CodeRejection::PkceMismatch);
    }
    Ok(())
}
