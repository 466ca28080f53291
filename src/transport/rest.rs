// ABOUTME: Stateless JSON adapter for POST /tools/{name} and POST /mcp/call
// ABOUTME: Returns the raw tool result on success and a structured error payload otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::{Adapter, ToolCall, ToolOutcome, Transport};
use crate::errors::ToolError;

/// Body of `POST /mcp/call`
#[derive(Debug, Clone, Deserialize)]
pub struct McpCallRequest {
    /// Tool to execute
    pub tool_name: String,
    /// Argument object
    #[serde(default)]
    pub arguments: Value,
}

/// REST adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct RestAdapter;

impl RestAdapter {
    /// HTTP status for a tool error
    #[must_use]
    pub fn status_for(error: &ToolError) -> StatusCode {
        StatusCode::from_u16(error.code().http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[async_trait]
impl Adapter for RestAdapter {
    type Request = McpCallRequest;
    type Response = (StatusCode, Value);
    type Correlation = ();

    fn transport(&self) -> Transport {
        Transport::Rest
    }

    fn decode(&self, request: McpCallRequest) -> ((), Result<ToolCall, ToolError>) {
        ((), ToolCall::from_value(request.tool_name, request.arguments))
    }

    fn encode(&self, (): (), outcome: ToolOutcome) -> (StatusCode, Value) {
        match outcome {
            Ok(result) => (StatusCode::OK, result),
            Err(e) => (Self::status_for(&e), e.to_payload()),
        }
    }
}
