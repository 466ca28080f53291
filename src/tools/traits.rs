// ABOUTME: Defines the McpTool trait and ToolCapabilities for the built-in tool catalogue.
// ABOUTME: Tools implement this trait to be registered and executed via the ToolRegistry.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MCP Tool Trait and Capabilities
//!
//! Every built-in tool implements [`McpTool`]: metadata for `tools/list`,
//! capability flags for logging, and async execution against the
//! [`ToolExecutionContext`].

use async_trait::async_trait;
use bitflags::bitflags;
use serde_json::{Map, Value};

use crate::errors::ToolError;
use crate::models::ToolDescriptor;

use super::context::ToolExecutionContext;

bitflags! {
    /// Capabilities that tools declare for discovery and logging.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ToolCapabilities: u8 {
        /// Tool reads from the knowledge store
        const READS_DATA = 0b0000_0001;
        /// Tool writes to the knowledge store
        const WRITES_DATA = 0b0000_0010;
        /// Tool needs a backend outside this process
        const EXTERNAL_BACKEND = 0b0000_0100;
    }
}

impl ToolCapabilities {
    /// Whether the tool mutates the store
    #[must_use]
    pub const fn writes_data(self) -> bool {
        self.contains(Self::WRITES_DATA)
    }

    /// Get a description of all enabled capabilities for logging
    #[must_use]
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.contains(Self::READS_DATA) {
            parts.push("reads_data");
        }
        if self.contains(Self::WRITES_DATA) {
            parts.push("writes_data");
        }
        if self.contains(Self::EXTERNAL_BACKEND) {
            parts.push("external_backend");
        }
        if parts.is_empty() {
            "none".to_owned()
        } else {
            parts.join(", ")
        }
    }
}

/// A callable tool.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema of the accepted arguments
    fn input_schema(&self) -> Value;

    /// Capability flags
    fn capabilities(&self) -> ToolCapabilities;

    /// Execute the tool
    ///
    /// # Errors
    /// Returns `InvalidArguments` for unusable arguments and `ExecutionFailed`
    /// when the tool cannot complete
    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError>;

    /// Published descriptor
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name(), self.description(), self.input_schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_capabilities() {
        let caps = ToolCapabilities::READS_DATA | ToolCapabilities::WRITES_DATA;
        assert_eq!(caps.describe(), "reads_data, writes_data");
        assert!(caps.writes_data());
        assert_eq!(ToolCapabilities::empty().describe(), "none");
    }
}
