// ABOUTME: OAuth 2.1 server persistence models for clients, authorization codes, and tokens
// ABOUTME: Records stored behind the repository traits of the authorization server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// OAuth 2.1 grant types this server issues tokens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization code exchange (RFC 6749 section 4.1)
    AuthorizationCode,
    /// Refresh token exchange (RFC 6749 section 6)
    RefreshToken,
}

impl GrantType {
    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Every grant type, in discovery order
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::AuthorizationCode, Self::RefreshToken]
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization_code" => Ok(Self::AuthorizationCode),
            "refresh_token" => Ok(Self::RefreshToken),
            other => Err(format!("Unsupported grant_type: {other}")),
        }
    }
}

/// PKCE code challenge method (RFC 7636 section 4.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    /// `BASE64URL(SHA256(verifier))` without padding
    S256,
    /// Verifier compared verbatim
    #[serde(rename = "plain")]
    Plain,
}

impl CodeChallengeMethod {
    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

impl FromStr for CodeChallengeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S256" => Ok(Self::S256),
            "plain" => Ok(Self::Plain),
            other => Err(format!("Unsupported code_challenge_method: {other}")),
        }
    }
}

/// Stored OAuth 2.1 client
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    /// OAuth 2.1 client identifier
    pub client_id: String,
    /// Human-readable client name
    pub client_name: String,
    /// Argon2 hash of the client secret, `None` for public clients
    pub client_secret_hash: Option<String>,
    /// Registered redirect URIs, matched exactly
    pub redirect_uris: Vec<String>,
    /// Grant types this client may use
    pub grant_types: Vec<GrantType>,
    /// Default requestable scope
    pub scope: String,
    /// Soft-delete flag
    pub is_active: bool,
    /// When this client was registered
    pub created_at: DateTime<Utc>,
}

impl OAuth2Client {
    /// Public clients authenticate with PKCE alone
    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.client_secret_hash.is_none()
    }

    /// Token endpoint authentication method advertised for this client
    #[must_use]
    pub const fn token_endpoint_auth_method(&self) -> &'static str {
        if self.is_public() {
            "none"
        } else {
            "client_secret_post"
        }
    }

    /// Whether this client registered the given grant type
    #[must_use]
    pub fn allows_grant(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }
}

/// Single-use authorization code
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    /// The code value
    pub code: String,
    /// Client that requested the code
    pub client_id: String,
    /// Principal on whose behalf consent was granted
    pub user_id: String,
    /// Redirect URI that must be repeated at the token endpoint
    pub redirect_uri: String,
    /// Granted scope
    pub scope: String,
    /// PKCE challenge
    pub code_challenge: String,
    /// PKCE method
    pub code_challenge_method: CodeChallengeMethod,
    /// Optional audience indicator (RFC 8707)
    pub resource: Option<String>,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
    /// Monotonic false to true on redemption
    pub used: bool,
}

impl AuthorizationCode {
    /// Whether the code has passed its expiry instant
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Issued access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Token value
    pub token: String,
    /// Client the token was issued to
    pub client_id: String,
    /// Principal the token acts for
    pub user_id: String,
    /// Granted scope
    pub scope: String,
    /// Optional audience indicator
    pub resource: Option<String>,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
    /// Issue instant
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token has passed its expiry instant
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Issued refresh token
#[derive(Debug, Clone)]
pub struct RefreshToken {
    /// Token value, stable across refreshes
    pub token: String,
    /// Access token currently paired with this refresh token
    pub access_token_id: String,
    /// Client the token was issued to
    pub client_id: String,
    /// Principal the token acts for
    pub user_id: String,
    /// Originally granted scope
    pub scope: String,
    /// Optional audience indicator carried onto refreshed access tokens
    pub resource: Option<String>,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
    /// Issue instant
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token has passed its expiry instant
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_parsing() {
        assert_eq!(
            "authorization_code".parse::<GrantType>(),
            Ok(GrantType::AuthorizationCode)
        );
        assert_eq!(
            "refresh_token".parse::<GrantType>(),
            Ok(GrantType::RefreshToken)
        );
        assert!("client_credentials".parse::<GrantType>().is_err());
    }

    #[test]
    fn test_challenge_method_is_case_sensitive() {
        assert_eq!(
            "S256".parse::<CodeChallengeMethod>(),
            Ok(CodeChallengeMethod::S256)
        );
        assert!("s256".parse::<CodeChallengeMethod>().is_err());
    }
}
