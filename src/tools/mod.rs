// ABOUTME: Tool invocation core shared by every transport
// ABOUTME: ToolInvoker boundary plus the built-in registry and its in-memory knowledge store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Invocation Core
//!
//! Transports see tools only through [`ToolInvoker`]: a descriptor list and a
//! single `execute(name, arguments)` entry point. [`ToolRegistry`] is the
//! built-in implementation; other backends plug in behind the same trait.

/// Context lent to tool executions
pub mod context;
/// Built-in tool implementations
pub mod implementations;
/// In-memory knowledge store
pub mod knowledge;
/// Tool registry
pub mod registry;
/// Tool trait and capability flags
pub mod traits;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ToolError;
use crate::models::ToolDescriptor;

pub use knowledge::KnowledgeStore;
pub use registry::ToolRegistry;
pub use traits::{McpTool, ToolCapabilities};

/// Opaque tool execution boundary
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Published tool descriptors
    fn list_tools(&self) -> Vec<ToolDescriptor>;

    /// Whether `name` is a known tool
    fn has_tool(&self, name: &str) -> bool;

    /// Execute a tool
    ///
    /// # Errors
    /// `NotFound` for unknown tools, `InvalidArguments` or `ExecutionFailed` from the tool
    async fn execute(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, ToolError>;
}
