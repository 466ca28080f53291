// ABOUTME: Error types re-exported from mcp-gateway-core
// ABOUTME: AppError and ErrorCode for HTTP surfaces, ToolError for the invocation boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! The definitions live in the core crate so the workspace shares one
//! taxonomy; this module keeps `crate::errors::*` paths stable.

pub use mcp_gateway_core::errors::*;
