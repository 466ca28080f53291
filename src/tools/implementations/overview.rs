// ABOUTME: Read-only overview tools over operator-managed data.
// ABOUTME: Instructions, administrator identity, projects, conversations, and the knowledge graph.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::Args;
use crate::constants::service_names;
use crate::errors::ToolError;
use crate::tools::context::ToolExecutionContext;
use crate::tools::traits::{McpTool, ToolCapabilities};

const PROJECT_STATUSES: [&str; 4] = ["active", "completed", "paused", "archived"];
const NODE_CONTENT_CHARS: usize = 200;

/// List operator instructions.
pub struct GetInstructionsTool;

#[async_trait]
impl McpTool for GetInstructionsTool {
    fn name(&self) -> &'static str {
        "get_instructions"
    }

    fn description(&self) -> &'static str {
        "Retrieve general instructions and guidelines configured by the administrators."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "category": {"type": "string", "description": "Filter by category"},
                "active_only": {"type": "boolean", "description": "Only return active instructions"}
            }
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let instructions = context
            .store
            .instructions(args.opt_str("category")?, args.bool_or("active_only", true)?)
            .await;

        Ok(json!({
            "success": true,
            "count": instructions.len(),
            "instructions": instructions,
        }))
    }
}

/// Describe the administrators behind this server.
pub struct WhoAmITalkingToTool;

#[async_trait]
impl McpTool for WhoAmITalkingToTool {
    fn name(&self) -> &'static str {
        "who_am_i_talking_to"
    }

    fn description(&self) -> &'static str {
        "Get information about the MCP server administrators and their profiles."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        _args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        Ok(json!({
            "success": true,
            "server_name": service_names::DISPLAY_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "admins": context.store.admins().await,
        }))
    }
}

/// Overview of managed projects.
pub struct ProjectOverviewTool;

#[async_trait]
impl McpTool for ProjectOverviewTool {
    fn name(&self) -> &'static str {
        "project_overview"
    }

    fn description(&self) -> &'static str {
        "Get overview of projects being managed with status, priorities, and details."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "integer", "description": "Specific project ID"},
                "status": {"type": "string", "enum": PROJECT_STATUSES, "description": "Filter by status"}
            }
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let status = args.opt_str("status")?;
        if status.is_some_and(|s| !PROJECT_STATUSES.contains(&s)) {
            return Err(ToolError::invalid_arguments(
                self.name(),
                format!("'status' must be one of {}", PROJECT_STATUSES.join(", ")),
            ));
        }

        let projects = context
            .store
            .projects(args.opt_id("project_id")?, status)
            .await;
        Ok(json!({
            "success": true,
            "count": projects.len(),
            "projects": projects,
        }))
    }
}

/// Overview of recorded conversations.
pub struct ConversationOverviewTool;

#[async_trait]
impl McpTool for ConversationOverviewTool {
    fn name(&self) -> &'static str {
        "conversation_overview"
    }

    fn description(&self) -> &'static str {
        "Get overview of recorded conversations and their content."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": "Specific session ID"},
                "limit": {"type": "integer", "description": "Maximum conversations"},
                "include_messages": {"type": "boolean", "description": "Include message history"}
            }
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let include_messages = args.bool_or("include_messages", false)?;

        let conversations: Vec<Value> = context
            .store
            .conversations(args.opt_str("session_id")?, args.limit(20)?)
            .await
            .into_iter()
            .map(|conversation| {
                let mut entry = json!(conversation);
                entry["message_count"] = json!(conversation.messages.len());
                if include_messages {
                    entry["messages"] = json!(conversation.messages);
                }
                entry
            })
            .collect();

        Ok(json!({
            "success": true,
            "count": conversations.len(),
            "conversations": conversations,
        }))
    }
}

/// Knowledge graph nodes and edges for visualization.
pub struct GetKnowledgeGraphTool;

#[async_trait]
impl McpTool for GetKnowledgeGraphTool {
    fn name(&self) -> &'static str {
        "get_knowledge_graph"
    }

    fn description(&self) -> &'static str {
        "Get knowledge graph data for visualization."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "node_type": {"type": "string", "description": "Filter by node type"},
                "limit": {"type": "integer", "description": "Maximum nodes"}
            }
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let (mut nodes, edges) = context
            .store
            .graph(args.opt_str("node_type")?, args.limit(100)?)
            .await;

        for node in &mut nodes {
            node.content = node
                .content
                .take()
                .map(|c| c.chars().take(NODE_CONTENT_CHARS).collect());
        }

        Ok(json!({ "success": true, "nodes": nodes, "edges": edges }))
    }
}
