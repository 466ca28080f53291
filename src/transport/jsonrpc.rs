// ABOUTME: JSON-RPC tools/call adapter shared by the stdio and SSE transports
// ABOUTME: Wraps tool results and tool errors as MCP text content with an isError flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Adapter, ToolCall, ToolOutcome, Transport};
use crate::errors::ToolError;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// `tools/call` adapter for one JSON-RPC transport
#[derive(Debug, Clone, Copy)]
pub struct JsonRpcToolAdapter {
    transport: Transport,
}

impl JsonRpcToolAdapter {
    /// Adapter attributed to `transport` in logs
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

/// MCP `CallToolResult` with a single text item
#[must_use]
pub fn tool_result_content(outcome: &ToolOutcome) -> Value {
    let (text, is_error) = match outcome {
        Ok(result) => (
            serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string()),
            false,
        ),
        Err(e) => (e.to_payload().to_string(), true),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

#[async_trait]
impl Adapter for JsonRpcToolAdapter {
    type Request = JsonRpcRequest;
    type Response = JsonRpcResponse;
    type Correlation = Option<Value>;

    fn transport(&self) -> Transport {
        self.transport
    }

    fn decode(&self, request: JsonRpcRequest) -> (Option<Value>, Result<ToolCall, ToolError>) {
        let params = request.params.unwrap_or(Value::Null);
        let call = match params.get("name").and_then(Value::as_str) {
            Some(name) => ToolCall::from_value(
                name,
                params.get("arguments").cloned().unwrap_or(Value::Null),
            ),
            None => Err(ToolError::invalid_arguments(
                "",
                "params.name is required for tools/call",
            )),
        };
        (request.id, call)
    }

    fn encode(&self, id: Option<Value>, outcome: ToolOutcome) -> JsonRpcResponse {
        JsonRpcResponse::success(id, tool_result_content(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::tools::{KnowledgeStore, ToolRegistry};

    #[tokio::test]
    async fn test_unknown_tool_is_error_content() {
        let tools = ToolRegistry::with_builtin_tools(Arc::new(KnowledgeStore::new()));
        let request = JsonRpcRequest::with_id(
            "tools/call",
            Some(json!({"name": "missing", "arguments": {}})),
            json!(3),
        );
        let response = JsonRpcToolAdapter::new(Transport::Stdio)
            .handle(&tools, request)
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("tool_not_found"));
        assert_eq!(response.id, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_success_wraps_result_text() {
        let tools = ToolRegistry::with_builtin_tools(Arc::new(KnowledgeStore::new()));
        let request = JsonRpcRequest::with_id(
            "tools/call",
            Some(json!({"name": "get_memory"})),
            json!("a"),
        );
        let response = JsonRpcToolAdapter::new(Transport::Sse)
            .handle(&tools, request)
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        let inner: Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner["success"], true);
    }
}
