// ABOUTME: Progress-streaming adapter for POST /stream/execute
// ABOUTME: Emits progress, optional partial chunks, one data or error event, then complete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::events::{partial_events, EventSink, StreamEvent};
use super::{invoke, Adapter, ToolCall, ToolOutcome, Transport};
use crate::constants::defaults;
use crate::errors::ToolError;
use crate::tools::ToolInvoker;

const fn default_stream() -> bool {
    true
}

/// Body of `POST /stream/execute`
#[derive(Debug, Clone, Deserialize)]
pub struct StreamExecuteRequest {
    /// Tool to execute
    pub tool_name: String,
    /// Argument object
    #[serde(default)]
    pub arguments: Value,
    /// `false` answers like the REST transport
    #[serde(default = "default_stream")]
    pub stream: bool,
    /// Results longer than this many bytes are split into partial events
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

/// Per-request data the encoder needs
#[derive(Debug, Clone)]
pub struct StreamCorrelation {
    tool_name: String,
    chunk_size: usize,
}

/// Streaming adapter
#[derive(Debug, Clone, Copy)]
pub struct StreamingAdapter {
    default_chunk_size: usize,
}

impl Default for StreamingAdapter {
    fn default() -> Self {
        Self::new(defaults::STREAM_CHUNK_SIZE)
    }
}

impl StreamingAdapter {
    /// Adapter splitting results longer than `default_chunk_size` unless a request overrides it
    #[must_use]
    pub const fn new(default_chunk_size: usize) -> Self {
        Self { default_chunk_size }
    }

    /// Start a producer task and return the consuming end of its bounded channel
    ///
    /// Dropping the receiver stops event production; a tool call already in
    /// flight still runs to completion.
    #[must_use]
    pub fn spawn(
        self,
        tools: Arc<dyn ToolInvoker>,
        request: StreamExecuteRequest,
        capacity: usize,
    ) -> mpsc::Receiver<StreamEvent> {
        let (sink, receiver) = EventSink::channel(capacity);
        tokio::spawn(async move {
            self.produce(tools.as_ref(), request, &sink).await;
        });
        receiver
    }

    /// Write the full event sequence for one request into `sink`
    pub async fn produce(
        &self,
        tools: &dyn ToolInvoker,
        request: StreamExecuteRequest,
        sink: &EventSink,
    ) {
        let (correlation, decoded) = self.decode(request);
        let tool_name = correlation.tool_name.clone(); // Safe: correlation is consumed by encode

        if !sink
            .emit(StreamEvent::progress(0.0, format!("Starting {tool_name} execution")))
            .await
        {
            tracing::debug!(tool_name = %tool_name, "Stream consumer left before execution");
            return;
        }

        let outcome = match decoded {
            Ok(call) => {
                if !sink.emit(StreamEvent::progress(0.3, "Executing tool")).await {
                    tracing::debug!(tool_name = %tool_name, "Stream consumer left before execution");
                    return;
                }
                let outcome = invoke(tools, Transport::Streaming, call).await;
                if outcome.is_ok()
                    && !sink.emit(StreamEvent::progress(0.9, "Processing results")).await
                {
                    tracing::debug!(tool_name = %tool_name, "Stream consumer left after execution");
                    return;
                }
                outcome
            }
            Err(e) => Err(e),
        };

        for event in self.encode(correlation, outcome) {
            if !sink.emit(event).await {
                tracing::debug!(tool_name = %tool_name, "Stream consumer left during delivery");
                return;
            }
        }
    }
}

#[async_trait]
impl Adapter for StreamingAdapter {
    type Request = StreamExecuteRequest;
    type Response = Vec<StreamEvent>;
    type Correlation = StreamCorrelation;

    fn transport(&self) -> Transport {
        Transport::Streaming
    }

    fn decode(&self, request: StreamExecuteRequest) -> (StreamCorrelation, Result<ToolCall, ToolError>) {
        let correlation = StreamCorrelation {
            tool_name: request.tool_name.clone(), // Safe: name also moves into the call
            chunk_size: request
                .chunk_size
                .filter(|size| *size > 0)
                .unwrap_or(self.default_chunk_size),
        };
        (correlation, ToolCall::from_value(request.tool_name, request.arguments))
    }

    fn encode(&self, correlation: StreamCorrelation, outcome: ToolOutcome) -> Vec<StreamEvent> {
        let StreamCorrelation {
            tool_name,
            chunk_size,
        } = correlation;

        match outcome {
            Ok(result) => {
                let serialized = serde_json::to_string(&result).unwrap_or_default();
                let mut events = if serialized.len() > chunk_size {
                    partial_events(&serialized, chunk_size)
                } else {
                    Vec::new()
                };
                events.push(StreamEvent::data(result));
                events.push(StreamEvent::complete(format!("{tool_name} execution completed")));
                events
            }
            Err(e) => vec![
                StreamEvent::error(e.to_payload()),
                StreamEvent::complete(format!("{tool_name} execution failed")),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::tools::{KnowledgeStore, ToolRegistry};

    fn request(tool_name: &str, arguments: Value, chunk_size: Option<usize>) -> StreamExecuteRequest {
        StreamExecuteRequest {
            tool_name: tool_name.to_owned(),
            arguments,
            stream: true,
            chunk_size,
        }
    }

    async fn collect(
        tools: Arc<dyn ToolInvoker>,
        request: StreamExecuteRequest,
    ) -> Vec<StreamEvent> {
        let mut receiver = StreamingAdapter::default().spawn(tools, request, 8);
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_success_sequence() {
        let tools: Arc<dyn ToolInvoker> =
            Arc::new(ToolRegistry::with_builtin_tools(Arc::new(KnowledgeStore::new())));
        let events = collect(tools, request("get_memory", json!({}), None)).await;
        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, ["progress", "progress", "progress", "data", "complete"]);
    }

    #[tokio::test]
    async fn test_unknown_tool_sequence() {
        let tools: Arc<dyn ToolInvoker> =
            Arc::new(ToolRegistry::with_builtin_tools(Arc::new(KnowledgeStore::new())));
        let events = collect(tools, request("missing", json!({}), None)).await;
        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(kinds, ["progress", "progress", "error", "complete"]);
        let StreamEvent::Error { data, .. } = &events[2] else {
            panic!("expected error event");
        };
        assert_eq!(data["error"], "tool_not_found");
    }

    #[tokio::test]
    async fn test_large_result_is_chunked_before_data() {
        let store = Arc::new(KnowledgeStore::seeded().await);
        let tools: Arc<dyn ToolInvoker> = Arc::new(ToolRegistry::with_builtin_tools(store));
        let events = collect(tools, request("get_instructions", json!({}), Some(64))).await;

        let partials = events.iter().filter(|e| e.kind() == "partial").count();
        assert!(partials > 1);
        let data_at = events.iter().position(|e| e.kind() == "data").unwrap();
        let last_partial = events.iter().rposition(|e| e.kind() == "partial").unwrap();
        assert!(last_partial < data_at);
        assert_eq!(events.iter().filter(|e| e.is_terminal_outcome()).count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_receiver_still_commits_write() {
        let store = Arc::new(KnowledgeStore::new());
        let tools: Arc<dyn ToolInvoker> =
            Arc::new(ToolRegistry::with_builtin_tools(store.clone()));
        let adapter = StreamingAdapter::default();
        let (sink, mut receiver) = EventSink::channel(8);

        let producer = {
            let tools = tools.clone();
            tokio::spawn(async move {
                adapter
                    .produce(
                        tools.as_ref(),
                        request("create_memory", json!({"content": "kept"}), None),
                        &sink,
                    )
                    .await;
            })
        };
        // Consume the two pre-execution events, then disconnect
        receiver.recv().await.unwrap();
        receiver.recv().await.unwrap();
        drop(receiver);
        producer.await.unwrap();

        let remaining = store
            .find_memories(&crate::tools::knowledge::MemoryQuery {
                limit: 10,
                ..Default::default()
            })
            .await;
        assert_eq!(remaining.len(), 1);
    }
}
