// ABOUTME: OAuth 2.1 authorization server with mandatory PKCE and dynamic client registration
// ABOUTME: Client registry, code store, token store, protocol endpoints, and repository seams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authorization code issuance and single-use redemption
pub mod auth_codes;
/// RFC 7591 dynamic client registration and client authentication
pub mod client_registration;
/// OAuth 2.1 authorization server endpoints
pub mod endpoints;
/// In-memory repository implementation
pub mod memory;
/// OAuth 2.1 wire models and protocol errors
pub mod models;
/// Repository traits for clients, codes, and tokens
pub mod repository;
/// Random credential generation, secret hashing, and PKCE
pub mod secrets;
/// Access and refresh token lifecycle
pub mod tokens;

pub use auth_codes::{AuthorizationCodeStore, CodeExchange, CodeGrant};
pub use client_registration::{ClientRegistry, NewClient, RegisteredClient};
pub use endpoints::{OAuth2AuthorizationServer, OAuth2ServerSettings};
pub use memory::InMemoryOAuthStore;
pub use models::{
    AuthorizationServerMetadata, AuthorizeError, AuthorizeRequest, AuthorizeResponse,
    ClientRegistrationRequest, ClientRegistrationResponse, OAuth2Error,
    ProtectedResourceMetadata, RevokeRequest, TokenRequest, TokenResponse,
};
pub use repository::{AuthCodeRepository, ClientRepository, CodeRejection, TokenRepository};
pub use tokens::{RefreshPolicy, TokenClaims, TokenPair, TokenStore, TokenTypeHint};
