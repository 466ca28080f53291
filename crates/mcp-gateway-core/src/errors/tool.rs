// ABOUTME: Tool-specific error types for the tool invocation boundary
// ABOUTME: Provides structured errors that every transport renders in its native shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Error Types
//!
//! Errors raised at the boundary between the transport gateway and the tool
//! invocation core. Transports never propagate these as transport faults;
//! they encode them as structured payloads using [`ToolError::code`].

use super::ErrorCode;
use thiserror::Error;

/// Errors specific to tool operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Tool was not found in the registry
    #[error("Tool '{tool_name}' not found")]
    NotFound {
        /// Name of the requested tool
        tool_name: String,
    },
    /// Arguments could not be applied to the tool
    #[error("Invalid arguments for tool '{tool_name}': {reason}")]
    InvalidArguments {
        /// Name of the tool
        tool_name: String,
        /// Why the arguments were rejected
        reason: String,
    },
    /// Tool execution failed
    #[error("Tool '{tool_name}' execution failed: {details}")]
    ExecutionFailed {
        /// Name of the tool that failed
        tool_name: String,
        /// Details about the failure
        details: String,
    },
}

impl ToolError {
    /// Create a "not found" error
    #[must_use]
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::NotFound {
            tool_name: tool_name.into(),
        }
    }

    /// Create an "invalid arguments" error
    #[must_use]
    pub fn invalid_arguments(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an "execution failed" error
    #[must_use]
    pub fn execution_failed(tool_name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            details: details.into(),
        }
    }

    /// Get the tool name associated with this error
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            Self::NotFound { tool_name }
            | Self::InvalidArguments { tool_name, .. }
            | Self::ExecutionFailed { tool_name, .. } => tool_name,
        }
    }

    /// Error code carried on the wire
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ToolNotFound,
            Self::InvalidArguments { .. } => ErrorCode::InvalidInput,
            Self::ExecutionFailed { .. } => ErrorCode::ToolExecutionError,
        }
    }

    /// Structured payload used by the REST and streaming transports
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code().as_str(),
            "message": self.to_string(),
            "tool_name": self.tool_name(),
        })
    }
}
