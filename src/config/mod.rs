// ABOUTME: Configuration management module for centralized server settings and parameters
// ABOUTME: Exposes the environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the MCP gateway
//!
//! - **Environment**: Server configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::{Environment, LogLevel, ServerConfig};
