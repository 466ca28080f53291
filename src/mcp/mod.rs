// ABOUTME: Model Context Protocol server: JSON-RPC method dispatch, shared resources, lifecycle
// ABOUTME: Ties the authorization server and the transport gateway into one runnable server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// JSON-RPC method handlers for stdio and SSE
pub mod protocol;
/// Shared resource container
pub mod resources;
/// Router assembly and serving
pub mod server;

pub use protocol::ProtocolHandler;
pub use resources::ServerResources;
pub use server::GatewayServer;
