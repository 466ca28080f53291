// ABOUTME: Main library entry point for the MCP gateway and its OAuth 2.1 authorization server
// ABOUTME: Exposes the authorization server, the four-transport gateway, and the built-in tool core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): zero-tolerance unsafe policy, also enforced by workspace lints
#![deny(unsafe_code)]

//! # MCP Gateway
//!
//! A Model Context Protocol server with two halves sharing one tool core:
//!
//! - **Authorization server**: OAuth 2.1 with mandatory PKCE, dynamic client
//!   registration, refresh, revocation, and discovery documents.
//! - **Transport gateway**: stdio, SSE, REST, and progress streaming, all
//!   decoding into the same tool call and authenticated by one bearer check.
//!
//! ## Architecture
//!
//! - **`oauth2_server`**: client registry, code store, token store, protocol endpoints
//! - **`middleware`**: bearer authentication, CORS, request ids
//! - **`transport`**: the `Adapter` contract and its four implementations
//! - **`tools`**: tool trait, registry, and the in-memory knowledge store
//! - **`mcp`**: JSON-RPC dispatch, shared resources, router assembly
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mcp_gateway::config::environment::ServerConfig;
//! use mcp_gateway::mcp::{GatewayServer, ServerResources};
//! use mcp_gateway::tools::{KnowledgeStore, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let tools = Arc::new(ToolRegistry::with_builtin_tools(Arc::new(KnowledgeStore::new())));
//!     let resources = ServerResources::in_memory(config, tools).await?;
//!     let port = resources.config.http_port;
//!
//!     GatewayServer::new(Arc::new(resources))
//!         .run_http("127.0.0.1", port)
//!         .await
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants, re-exported from the core crate
pub mod constants;

/// Unified error handling, re-exported from the core crate
pub mod errors;

/// JSON-RPC 2.0 message types
pub mod jsonrpc;

/// Structured logging setup
pub mod logging;

/// MCP server: protocol dispatch, resources, lifecycle
pub mod mcp;

/// HTTP middleware: bearer authentication, CORS, request ids
pub mod middleware;

/// OAuth records and tool descriptors, re-exported from the core crate
pub mod models;

/// OAuth 2.1 authorization server
pub mod oauth2_server;

/// HTTP route groups
pub mod routes;

/// Server-Sent Events transport
pub mod sse;

/// Tool trait, registry, and built-in tools
pub mod tools;

/// Transport gateway adapters
pub mod transport;
