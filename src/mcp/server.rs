// ABOUTME: Gateway server lifecycle: router assembly, HTTP serving, stdio serving, and housekeeping
// ABOUTME: Merges every route group behind CORS, request ids, and HTTP tracing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gateway Server
//!
//! One `Router` serves the authorization server and the three HTTP
//! transports. The stdio transport shares the same tool invoker but runs
//! without the HTTP stack.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::resources::ServerResources;
use crate::middleware::{request_id_middleware, setup_cors};
use crate::routes::{
    HealthRoutes, InfoRoutes, OAuth2Routes, OpenApiRoutes, StreamRoutes, ToolRoutes,
};
use crate::sse::SseRoutes;
use crate::transport::stdio::StdioTransport;

/// Gateway server bound to one set of shared resources
pub struct GatewayServer {
    resources: Arc<ServerResources>,
}

impl GatewayServer {
    /// Create a server over `resources`
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Shared resources
    #[must_use]
    pub const fn resources(&self) -> &Arc<ServerResources> {
        &self.resources
    }

    /// Complete HTTP application: every route group plus middleware
    #[must_use]
    pub fn router(&self) -> Router {
        let resources = &self.resources;
        Router::new()
            .merge(InfoRoutes::routes(Arc::clone(resources)))
            .merge(HealthRoutes::routes(Arc::clone(resources)))
            .merge(OAuth2Routes::routes(Arc::clone(resources)))
            .merge(OpenApiRoutes::routes(Arc::clone(resources)))
            .merge(ToolRoutes::routes(Arc::clone(resources)))
            .merge(StreamRoutes::routes(Arc::clone(resources)))
            .merge(SseRoutes::routes(Arc::clone(resources)))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware))
            .layer(setup_cors(&resources.config))
    }

    /// Serve HTTP on `host:port` until ctrl-c
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind or the server fails
    pub async fn run_http(self, host: &str, port: u16) -> Result<()> {
        let address = format!("{host}:{port}");
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        let cleanup = self.spawn_cleanup_task();
        info!(address = %address, "MCP gateway listening");

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed");

        cleanup.abort();
        info!("MCP gateway stopped");
        served
    }

    /// Serve the stdio transport until stdin closes
    ///
    /// # Errors
    /// Returns an error if stdin or stdout fails
    pub async fn run_stdio(self) -> Result<()> {
        let cleanup = self.spawn_cleanup_task();
        let served = StdioTransport::new(Arc::clone(&self.resources.tools))
            .run()
            .await
            .context("stdio transport failed");
        cleanup.abort();
        served
    }

    /// Periodically purge expired authorization codes and tokens
    fn spawn_cleanup_task(&self) -> JoinHandle<()> {
        let oauth = Arc::clone(&self.resources.oauth);
        let every = Duration::from_secs(self.resources.config.transport.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let purged = oauth.purge_expired().await;
                if purged > 0 {
                    info!(purged, "Purged expired OAuth records");
                } else {
                    tracing::debug!("No expired OAuth records to purge");
                }
            }
        })
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
