// ABOUTME: Constants re-exported from mcp-gateway-core
// ABOUTME: OAuth lifetimes, endpoint paths, protocol identifiers, service names, and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Grouped by domain: `oauth`, `paths`, `protocol`, `service_names`, `defaults`.

pub use mcp_gateway_core::constants::*;
