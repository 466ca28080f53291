// ABOUTME: Centralized resource container for dependency injection across route handlers
// ABOUTME: Holds configuration, the authorization server, the authenticator, tools, and SSE sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources Module
//!
//! Everything a handler needs is built once at startup and shared behind
//! `Arc<ServerResources>`.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::environment::ServerConfig;
use crate::constants::defaults;
use crate::errors::AppResult;
use crate::middleware::{resolve_base_url, BearerAuthenticator};
use crate::oauth2_server::{OAuth2AuthorizationServer, TokenStore};
use crate::sse::SseManager;
use crate::tools::ToolInvoker;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Runtime configuration
    pub config: Arc<ServerConfig>,
    /// OAuth 2.1 authorization server
    pub oauth: Arc<OAuth2AuthorizationServer>,
    /// Bearer authenticator shared by every HTTP transport
    pub authenticator: Arc<BearerAuthenticator>,
    /// Tool invocation core
    pub tools: Arc<dyn ToolInvoker>,
    /// Live SSE sessions
    pub sse_manager: Arc<SseManager>,
}

impl ServerResources {
    /// Wire resources around an existing authorization server
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        oauth: Arc<OAuth2AuthorizationServer>,
        tools: Arc<dyn ToolInvoker>,
    ) -> Self {
        let authenticator = Arc::new(BearerAuthenticator::new(
            config.auth_token.clone(), // Safe: authenticator owns its copy of the secret
            Arc::clone(oauth.tokens()),
        ));

        Self {
            config,
            oauth,
            authenticator,
            tools,
            sse_manager: Arc::new(SseManager::new(defaults::EVENT_CHANNEL_CAPACITY)),
        }
    }

    /// Resources backed by the in-memory OAuth store, with the first-party
    /// client provisioned when configured
    ///
    /// # Errors
    /// Returns an error if the first-party client cannot be stored
    pub async fn in_memory(config: ServerConfig, tools: Arc<dyn ToolInvoker>) -> AppResult<Self> {
        let oauth = Arc::new(OAuth2AuthorizationServer::in_memory(config.oauth_settings()));

        if let Some(first_party) = &config.oauth.first_party_client {
            oauth
                .clients()
                .bootstrap_client(
                    &first_party.client_id,
                    &first_party.client_secret,
                    crate::constants::oauth::FIRST_PARTY_CLIENT_NAME,
                    &crate::constants::oauth::FIRST_PARTY_REDIRECT_URIS,
                )
                .await?;
        }

        Ok(Self::new(Arc::new(config), oauth, tools))
    }

    /// Token store behind the authenticator
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.oauth.tokens()
    }

    /// Externally visible base URL for discovery documents and challenges
    #[must_use]
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        resolve_base_url(
            self.config.public_base_url.as_deref(),
            headers,
            self.config.http_port,
        )
    }
}
