// ABOUTME: Web search tool; requires an outbound search backend.
// ABOUTME: Without one configured the call validates its arguments then reports an execution error.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::Args;
use crate::errors::ToolError;
use crate::tools::context::ToolExecutionContext;
use crate::tools::traits::{McpTool, ToolCapabilities};

/// Search the web.
pub struct WebSearchTool;

#[async_trait]
impl McpTool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web for information using DuckDuckGo."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "num_results": {"type": "integer", "description": "Number of results"}
            },
            "required": ["query"]
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::EXTERNAL_BACKEND
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        _context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let query = args.required_str("query")?;
        args.opt_i64("num_results")?;

        tracing::warn!(query_len = query.len(), "Web search requested without a search backend");
        Err(ToolError::execution_failed(
            self.name(),
            "web search backend is not configured",
        ))
    }
}
