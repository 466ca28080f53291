// ABOUTME: MCP protocol message handlers for the JSON-RPC transports
// ABOUTME: Handles initialize, notifications/initialized, ping, tools/list, and tools/call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MCP Protocol Handlers
//!
//! Method dispatch shared by the stdio and SSE transports. Tool calls go
//! through the [`JsonRpcToolAdapter`] so both channels report tool failures
//! identically.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::constants::{protocol, service_names};
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::transport::jsonrpc::JsonRpcToolAdapter;
use crate::transport::{Adapter, Transport};
use crate::tools::ToolInvoker;

/// MCP protocol handler bound to one transport
#[derive(Clone)]
pub struct ProtocolHandler {
    tools: Arc<dyn ToolInvoker>,
    adapter: JsonRpcToolAdapter,
}

impl ProtocolHandler {
    /// Handler dispatching tool calls to `tools`
    #[must_use]
    pub fn new(tools: Arc<dyn ToolInvoker>, transport: Transport) -> Self {
        Self {
            tools,
            adapter: JsonRpcToolAdapter::new(transport),
        }
    }

    /// Handle one raw message; `None` when no response is due
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(raw) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(transport = %self.adapter.transport(), "Invalid JSON-RPC message: {e}");
                Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    "Parse error",
                ))
            }
        }
    }

    /// Handle one decoded request; notifications never get a response
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(
            transport = %self.adapter.transport(),
            method = %request.method,
            "MCP request"
        );

        let is_notification = request.is_notification();
        let response = match request.method.as_str() {
            "initialize" => Self::handle_initialize(request.id),
            "notifications/initialized" | "initialized" => return None,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.adapter.handle(self.tools.as_ref(), request).await,
            other => {
                if is_notification {
                    debug!(method = %other, "Ignoring unknown notification");
                    return None;
                }
                JsonRpcResponse::error(
                    request.id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {other}"),
                )
            }
        };

        (!is_notification).then_some(response)
    }

    fn handle_initialize(id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": protocol::MCP_PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": service_names::MCP_GATEWAY,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools.list_tools() }))
    }
}
