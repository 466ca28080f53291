// ABOUTME: Transport gateway: one Adapter contract over stdio, SSE, REST, and streaming ingress
// ABOUTME: Shared tool invocation with timing and logging, plus argument normalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Transport Gateway
//!
//! Every ingress channel decodes its native request into a [`ToolCall`],
//! forwards it through [`invoke`] to the shared [`ToolInvoker`], and encodes
//! the outcome in its own shape. Authentication happens before `decode`, in
//! the route handlers or at the process boundary for stdio.

/// Stream event model and bounded producer
pub mod events;
/// JSON-RPC `tools/call` adapter shared by stdio and SSE
pub mod jsonrpc;
/// Stateless JSON adapter
pub mod rest;
/// Line-framed JSON-RPC over stdin/stdout
pub mod stdio;
/// Progress-streaming adapter
pub mod streaming;

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ToolError;
use crate::logging::AppLogger;
use crate::tools::ToolInvoker;

/// Ingress channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// Local duplex byte stream
    Stdio,
    /// Server-Sent-Events push channel
    Sse,
    /// Stateless HTTP request/response
    Rest,
    /// Chunked progress-streaming HTTP
    Streaming,
}

impl Transport {
    /// Identifier used in logs and server info
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Rest => "rest",
            Self::Streaming => "streaming",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-neutral tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Requested tool
    pub tool_name: String,
    /// Argument object
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Build a call from a JSON arguments value; `null` means no arguments.
    /// Arguments are normalized the same way for every transport.
    ///
    /// # Errors
    /// Returns `InvalidArguments` when `arguments` is not an object
    pub fn from_value(tool_name: impl Into<String>, arguments: Value) -> Result<Self, ToolError> {
        let tool_name = tool_name.into();
        let arguments = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => normalize_arguments(map),
            _ => {
                return Err(ToolError::invalid_arguments(
                    tool_name,
                    "arguments must be a JSON object",
                ))
            }
        };
        Ok(Self {
            tool_name,
            arguments,
        })
    }
}

/// Result of one tool invocation
pub type ToolOutcome = Result<Value, ToolError>;

/// Decode / invoke / encode contract implemented by every transport
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Transport-native request
    type Request: Send;
    /// Transport-native response
    type Response: Send;
    /// Request data the encoder needs back, such as a JSON-RPC id
    type Correlation: Send;

    /// Which channel this adapter serves
    fn transport(&self) -> Transport;

    /// Turn a native request into a tool call
    fn decode(&self, request: Self::Request) -> (Self::Correlation, Result<ToolCall, ToolError>);

    /// Turn an outcome into the native response
    fn encode(&self, correlation: Self::Correlation, outcome: ToolOutcome) -> Self::Response;

    /// Decode, invoke, and encode one request
    async fn handle(&self, tools: &dyn ToolInvoker, request: Self::Request) -> Self::Response {
        let (correlation, decoded) = self.decode(request);
        let outcome = match decoded {
            Ok(call) => invoke(tools, self.transport(), call).await,
            Err(e) => Err(e),
        };
        self.encode(correlation, outcome)
    }
}

/// Forward a call to the core, logging its duration and outcome
pub async fn invoke(tools: &dyn ToolInvoker, transport: Transport, call: ToolCall) -> ToolOutcome {
    let started = Instant::now();
    let outcome = tools.execute(&call.tool_name, call.arguments).await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    AppLogger::log_tool_call(
        transport.as_str(),
        &call.tool_name,
        outcome.is_ok(),
        duration_ms,
    );
    if let Err(e) = &outcome {
        tracing::warn!(
            transport = %transport,
            tool_name = %call.tool_name,
            error_code = %e.code().as_str(),
            "Tool call failed: {e}"
        );
    }
    outcome
}

/// Unwrap single-element string arrays into the bare string
///
/// Some HTTP clients send repeated form-style values as one-element lists.
#[must_use]
pub fn normalize_arguments(arguments: Map<String, Value>) -> Map<String, Value> {
    arguments
        .into_iter()
        .map(|(key, value)| match value {
            Value::Array(mut items) if items.len() == 1 && items[0].is_string() => {
                (key, items.remove(0))
            }
            other => (key, other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_unwraps_only_single_strings() {
        let args = json!({
            "query": ["rust"],
            "tags": ["a", "b"],
            "ids": [1],
            "limit": 5
        });
        let normalized = normalize_arguments(args.as_object().cloned().unwrap());
        assert_eq!(normalized["query"], "rust");
        assert_eq!(normalized["tags"], json!(["a", "b"]));
        assert_eq!(normalized["ids"], json!([1]));
        assert_eq!(normalized["limit"], 5);
    }

    #[test]
    fn test_tool_call_rejects_non_object_arguments() {
        assert!(ToolCall::from_value("get_memory", Value::Null).is_ok());
        let err = ToolCall::from_value("get_memory", json!([1, 2])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_tool_call_normalizes_arguments() {
        let call = ToolCall::from_value("get_memory", json!({"query": ["rust"]})).unwrap();
        assert_eq!(call.arguments["query"], "rust");
    }
}
