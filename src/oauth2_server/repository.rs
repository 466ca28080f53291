// ABOUTME: Repository traits for OAuth 2.1 clients, authorization codes, and tokens
// ABOUTME: Storage seam between the authorization server and any transactional backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # OAuth 2.1 Repositories
//!
//! The authorization server never touches shared maps directly. It talks to
//! three narrow repository traits, so tests substitute the in-memory store and
//! deployments can back them with any ACID-capable database.
//!
//! Every method is atomic per record. Different records may be mutated fully in
//! parallel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::errors::AppResult;
use crate::models::{AccessToken, AuthorizationCode, OAuth2Client, RefreshToken};

/// Why an authorization code could not be redeemed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    /// No code with that value exists
    NotFound,
    /// The code was already redeemed
    AlreadyUsed,
    /// The code passed its expiry instant
    Expired,
    /// The code was issued to a different client
    ClientMismatch,
    /// The redirect URI differs from the one used at authorization
    RedirectUriMismatch,
    /// The PKCE verifier does not match the stored challenge
    PkceMismatch,
}

impl CodeRejection {
    /// Human-readable `error_description`
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotFound => "Invalid authorization code",
            Self::AlreadyUsed => "Authorization code has already been used",
            Self::Expired => "Authorization code has expired",
            Self::ClientMismatch => "Authorization code was issued to another client",
            Self::RedirectUriMismatch => "redirect_uri does not match the authorization request",
            Self::PkceMismatch => "Invalid code_verifier",
        }
    }
}

impl fmt::Display for CodeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Predicate applied to a stored code inside the consume critical section
pub type CodeCheck<'a> = &'a (dyn Fn(&AuthorizationCode) -> Result<(), CodeRejection> + Send + Sync);

/// Registered OAuth clients
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Insert or replace a client record
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write
    async fn store_client(&self, client: OAuth2Client) -> AppResult<()>;

    /// Look up a client by id regardless of its active flag
    ///
    /// # Errors
    /// Returns an error if the backend read fails
    async fn get_client(&self, client_id: &str) -> AppResult<Option<OAuth2Client>>;

    /// Flip the soft-delete flag. Returns `false` for unknown clients.
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn set_client_active(&self, client_id: &str, is_active: bool) -> AppResult<bool>;
}

/// Single-use authorization codes
#[async_trait]
pub trait AuthCodeRepository: Send + Sync {
    /// Persist a freshly issued code
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write
    async fn store_auth_code(&self, code: AuthorizationCode) -> AppResult<()>;

    /// Redeem a code exactly once.
    ///
    /// Looks up the code, rejects it when already used or expired at `now`,
    /// runs `check` against the stored record, and marks it used only when
    /// every check passes. The whole sequence must be linearizable per code:
    /// of N concurrent callers presenting valid parameters, exactly one
    /// receives `Ok(Ok(_))` and the rest observe [`CodeRejection::AlreadyUsed`].
    ///
    /// # Errors
    /// Returns an error only on backend failure; protocol rejections are
    /// reported in the inner `Result`
    async fn consume_auth_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
        check: CodeCheck<'_>,
    ) -> AppResult<Result<AuthorizationCode, CodeRejection>>;

    /// Drop codes that expired before `now` or were already used
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn purge_auth_codes(&self, now: DateTime<Utc>) -> AppResult<usize>;
}

/// Access and refresh tokens
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist an access token
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write
    async fn store_access_token(&self, token: AccessToken) -> AppResult<()>;

    /// Look up an access token by value
    ///
    /// # Errors
    /// Returns an error if the backend read fails
    async fn get_access_token(&self, token: &str) -> AppResult<Option<AccessToken>>;

    /// Delete an access token. Returns whether a record was removed.
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn delete_access_token(&self, token: &str) -> AppResult<bool>;

    /// Persist a refresh token
    ///
    /// # Errors
    /// Returns an error if the backend rejects the write
    async fn store_refresh_token(&self, token: RefreshToken) -> AppResult<()>;

    /// Look up a refresh token by value
    ///
    /// # Errors
    /// Returns an error if the backend read fails
    async fn get_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// Atomically re-target a refresh token at a new access token.
    /// Returns the previously paired access token id, or `None` when the
    /// refresh token no longer exists.
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn repoint_refresh_token(
        &self,
        token: &str,
        access_token_id: &str,
    ) -> AppResult<Option<String>>;

    /// Delete a refresh token, returning the removed record
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn delete_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// Drop access and refresh tokens that expired before `now`
    ///
    /// # Errors
    /// Returns an error if the backend write fails
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> AppResult<usize>;
}
