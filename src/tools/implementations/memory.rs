// ABOUTME: Memory tools for storing and recalling knowledge-base entries.
// ABOUTME: create_memory validates type and importance; get_memory filters by text, type, and tags.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::Args;
use crate::errors::ToolError;
use crate::tools::context::ToolExecutionContext;
use crate::tools::knowledge::{MemoryQuery, NewMemory};
use crate::tools::traits::{McpTool, ToolCapabilities};

const MEMORY_TYPES: [&str; 5] = ["general", "fact", "reminder", "context", "preference"];

/// Store a new memory entry.
pub struct CreateMemoryTool;

#[async_trait]
impl McpTool for CreateMemoryTool {
    fn name(&self) -> &'static str {
        "create_memory"
    }

    fn description(&self) -> &'static str {
        "Create a new memory entry in the knowledge base. Use this to store important information, facts, reminders, or context that should be remembered."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {"type": "string", "description": "The memory content to store"},
                "memory_type": {
                    "type": "string",
                    "enum": MEMORY_TYPES,
                    "description": "Type of memory"
                },
                "importance": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 10,
                    "description": "Importance level (1-10)"
                },
                "tags": {"type": "array", "items": {"type": "string"}, "description": "Tags for categorization"},
                "metadata": {"type": "object", "description": "Additional metadata"}
            },
            "required": ["content"]
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::WRITES_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);

        let memory_type = args.opt_str("memory_type")?.unwrap_or("general");
        if !MEMORY_TYPES.contains(&memory_type) {
            return Err(ToolError::invalid_arguments(
                self.name(),
                format!("'memory_type' must be one of {}", MEMORY_TYPES.join(", ")),
            ));
        }

        let importance = args.opt_i64("importance")?.unwrap_or(5);
        let importance = u8::try_from(importance)
            .ok()
            .filter(|i| (1..=10).contains(i))
            .ok_or_else(|| {
                ToolError::invalid_arguments(self.name(), "'importance' must be between 1 and 10")
            })?;

        let memory = context
            .store
            .create_memory(NewMemory {
                content: args.required_str("content")?.to_owned(),
                memory_type: memory_type.to_owned(),
                importance,
                tags: args.str_list("tags")?,
                metadata: args.object("metadata")?,
            })
            .await;

        Ok(json!({ "success": true, "memory": memory }))
    }
}

/// Recall memories by text, type, or tags.
pub struct GetMemoryTool;

#[async_trait]
impl McpTool for GetMemoryTool {
    fn name(&self) -> &'static str {
        "get_memory"
    }

    fn description(&self) -> &'static str {
        "Retrieve memories from the knowledge base using semantic search or filters."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "memory_type": {"type": "string", "description": "Filter by memory type"},
                "tags": {"type": "array", "items": {"type": "string"}, "description": "Filter by tags"},
                "limit": {"type": "integer", "description": "Maximum results"},
                "semantic_search": {"type": "boolean", "description": "Use vector similarity search"}
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
        // No vector backend in process; semantic requests fall back to keyword matching
        let semantic = args.bool_or("semantic_search", true)?;

        let memories = context
            .store
            .find_memories(&MemoryQuery {
                text: args.opt_str("query")?.map(str::to_owned),
                memory_type: args.opt_str("memory_type")?.map(str::to_owned),
                tags: args.str_list("tags")?,
                limit: args.limit(10)?,
            })
            .await;

        Ok(json!({
            "success": true,
            "count": memories.len(),
            "search_mode": if semantic { "keyword_fallback" } else { "keyword" },
            "memories": memories,
        }))
    }
}
