// ABOUTME: Core data models re-exported from mcp-gateway-core
// ABOUTME: OAuth client, code, and token records plus tool descriptors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Persisted OAuth 2.1 records and the tool descriptor advertised by every
//! transport.

pub use mcp_gateway_core::models::*;
