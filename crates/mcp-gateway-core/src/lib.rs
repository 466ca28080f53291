// ABOUTME: Core types and constants for the MCP gateway and its OAuth 2.1 authorization server
// ABOUTME: Foundation crate with error handling, persisted OAuth records, tool descriptors, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # MCP Gateway Core
//!
//! Foundation crate providing shared types and constants for the MCP gateway.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ToolError`
//! - **constants**: Protocol constants, OAuth lifetimes, and defaults
//! - **models**: OAuth 2.1 records (clients, codes, tokens) and tool descriptors

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration defaults organized by domain
pub mod constants;

/// Core data models (OAuth clients, codes, tokens, tool descriptors)
pub mod models;
