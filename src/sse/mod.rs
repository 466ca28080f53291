// ABOUTME: Server-Sent Events transport for MCP clients
// ABOUTME: Session registry plus the GET /sse and POST /messages route pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Session registry with per-session outbound queues
pub mod manager;
/// HTTP route handlers for SSE endpoints
pub mod routes;

pub use manager::{DeliveryError, SessionGuard, SseManager};
pub use routes::SseRoutes;
