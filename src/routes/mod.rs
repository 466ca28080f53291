// ABOUTME: Route module organization for the gateway's HTTP endpoints
// ABOUTME: One router per concern; the server merges them and adds the shared middleware stack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the MCP gateway
//!
//! Each domain module holds route definitions and thin handlers that
//! authenticate, then delegate to the authorization server or an adapter.

/// Health check and system status routes
pub mod health;
/// Server description and documentation routes
pub mod info;
/// OAuth 2.1 authorization server routes
pub mod oauth2;
/// Generated OpenAPI document
pub mod openapi;
/// Streaming transport routes
pub mod stream;
/// REST transport routes
pub mod tools;

/// Health check route handlers
pub use health::HealthRoutes;
/// Informational route handlers
pub use info::InfoRoutes;
/// OAuth 2.1 server route handlers
pub use oauth2::OAuth2Routes;
/// OpenAPI document route
pub use openapi::OpenApiRoutes;
/// Streaming route handlers
pub use stream::StreamRoutes;
/// REST tool route handlers
pub use tools::ToolRoutes;
