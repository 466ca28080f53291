// ABOUTME: Central registry for MCP tools: name lookup, descriptor listing, and execution.
// ABOUTME: Implements ToolInvoker so every transport reaches tools through one entry point.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Registry
//!
//! Central registry for MCP tools, providing:
//! - Tool registration and lookup
//! - Descriptor listing in registration order for `tools/list`
//! - Execution with structured [`ToolError`]s
//!
//! The registry is built once at startup and then used immutably; tools are
//! `Arc`-wrapped so concurrent executions share them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::context::ToolExecutionContext;
use super::implementations::codebase::{CaptureCodebaseTool, GetCodebaseTool};
use super::implementations::memory::{CreateMemoryTool, GetMemoryTool};
use super::implementations::overview::{
    ConversationOverviewTool, GetInstructionsTool, GetKnowledgeGraphTool, ProjectOverviewTool,
    WhoAmITalkingToTool,
};
use super::implementations::web::WebSearchTool;
use super::knowledge::KnowledgeStore;
use super::traits::McpTool;
use super::ToolInvoker;
use crate::errors::ToolError;
use crate::models::ToolDescriptor;

/// Central registry for MCP tools.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn McpTool>>,
    order: Vec<String>,
    context: ToolExecutionContext,
}

impl ToolRegistry {
    /// Create an empty registry whose tools share `store`
    #[must_use]
    pub fn new(store: Arc<KnowledgeStore>) -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            context: ToolExecutionContext::new(store),
        }
    }

    /// Registry holding the ten built-in tools
    #[must_use]
    pub fn with_builtin_tools(store: Arc<KnowledgeStore>) -> Self {
        let mut registry = Self::new(store);
        registry.register_builtin_tools();
        registry
    }

    /// Register the built-in catalogue
    pub fn register_builtin_tools(&mut self) {
        let builtin: [Arc<dyn McpTool>; 10] = [
            Arc::new(CreateMemoryTool),
            Arc::new(GetMemoryTool),
            Arc::new(GetCodebaseTool),
            Arc::new(CaptureCodebaseTool),
            Arc::new(GetInstructionsTool),
            Arc::new(WhoAmITalkingToTool),
            Arc::new(ProjectOverviewTool),
            Arc::new(ConversationOverviewTool),
            Arc::new(WebSearchTool),
            Arc::new(GetKnowledgeGraphTool),
        ];
        for tool in builtin {
            self.register(tool);
        }
    }

    /// Register a tool in the registry
    ///
    /// # Returns
    ///
    /// `true` if the tool was registered, `false` if a tool with the same name exists
    pub fn register(&mut self, tool: Arc<dyn McpTool>) -> bool {
        let name = tool.name().to_owned();

        if self.tools.contains_key(&name) {
            warn!(tool_name = %name, "Tool is already registered, skipping");
            return false;
        }

        debug!(
            tool_name = %name,
            capabilities = %tool.capabilities().describe(),
            "Registering tool"
        );
        self.order.push(name.clone()); // Safe: name is the key in both collections
        self.tools.insert(name, tool);
        true
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn McpTool>> {
        self.tools.get(name)
    }

    /// Get the number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The store backing the tools
    #[must_use]
    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.context.store
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    async fn execute(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;
        tool.execute(arguments, &self.context).await
    }
}
