// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Reports liveness, readiness, tool count, and open SSE sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring
//!
//! Unauthenticated so load balancers can probe them.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::constants::service_names;
use crate::mcp::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "service": service_names::MCP_GATEWAY,
            "version": env!("CARGO_PKG_VERSION"),
            "tools": resources.tools.list_tools().len(),
            "sse_sessions": resources.sse_manager.active_sessions(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    async fn handle_ready() -> Json<Value> {
        Json(json!({
            "status": "ready",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
