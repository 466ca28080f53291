// ABOUTME: Stream event model for the progress-streaming transport
// ABOUTME: Timestamped progress, partial, data, error, and complete events written through a bounded channel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

/// Slice of an oversized result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialChunk {
    /// Slice of the serialized result
    pub chunk: String,
    /// Byte offset of the slice in the serialized result
    pub offset: usize,
    /// Whether this is the last slice
    #[serde(rename = "final")]
    pub is_final: bool,
}

/// One event on a streaming response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Execution progress between 0.0 and 1.0
    Progress {
        /// Emission time
        timestamp: DateTime<Utc>,
        /// Fraction complete
        progress: f64,
        /// Human-readable step
        message: String,
    },
    /// Slice of a result that exceeds the chunk size
    Partial {
        /// Emission time
        timestamp: DateTime<Utc>,
        /// Slice payload
        data: PartialChunk,
    },
    /// Successful result
    Data {
        /// Emission time
        timestamp: DateTime<Utc>,
        /// Tool result
        data: Value,
    },
    /// Structured failure
    Error {
        /// Emission time
        timestamp: DateTime<Utc>,
        /// Error payload with `error`, `message`, and `tool_name`
        data: Value,
    },
    /// End of stream
    Complete {
        /// Emission time
        timestamp: DateTime<Utc>,
        /// Always 1.0
        progress: f64,
        /// Human-readable summary
        message: String,
    },
}

impl StreamEvent {
    /// Progress event stamped now
    #[must_use]
    pub fn progress(progress: f64, message: impl Into<String>) -> Self {
        Self::Progress {
            timestamp: Utc::now(),
            progress,
            message: message.into(),
        }
    }

    /// Result event stamped now
    #[must_use]
    pub fn data(data: Value) -> Self {
        Self::Data {
            timestamp: Utc::now(),
            data,
        }
    }

    /// Error event stamped now
    #[must_use]
    pub fn error(data: Value) -> Self {
        Self::Error {
            timestamp: Utc::now(),
            data,
        }
    }

    /// Completion event stamped now
    #[must_use]
    pub fn complete(message: impl Into<String>) -> Self {
        Self::Complete {
            timestamp: Utc::now(),
            progress: 1.0,
            message: message.into(),
        }
    }

    /// Wire name of the event type
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Partial { .. } => "partial",
            Self::Data { .. } => "data",
            Self::Error { .. } => "error",
            Self::Complete { .. } => "complete",
        }
    }

    /// Whether this event carries the call outcome
    #[must_use]
    pub const fn is_terminal_outcome(&self) -> bool {
        matches!(self, Self::Data { .. } | Self::Error { .. })
    }

    /// `data: <json>\n\n` frame
    #[must_use]
    pub fn to_frame(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","data":{{"error":"serialization_error","message":"{e}"}}}}"#)
        });
        format!("data: {json}\n\n")
    }
}

/// Split `serialized` into slices of at most `chunk_size` bytes on char boundaries
#[must_use]
pub fn partial_events(serialized: &str, chunk_size: usize) -> Vec<StreamEvent> {
    let chunk_size = chunk_size.max(1);
    let mut events = Vec::new();
    let mut offset = 0;

    while offset < serialized.len() {
        let mut end = (offset + chunk_size).min(serialized.len());
        while !serialized.is_char_boundary(end) {
            end += 1;
        }
        events.push(StreamEvent::Partial {
            timestamp: Utc::now(),
            data: PartialChunk {
                chunk: serialized[offset..end].to_owned(),
                offset,
                is_final: end == serialized.len(),
            },
        });
        offset = end;
    }
    events
}

/// Producer half of a bounded event channel
///
/// Sending fails once the consumer is gone; producers stop at that point.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::Sender<StreamEvent>,
}

impl EventSink {
    /// Create a bounded channel and return both halves
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Send one event; `false` means the consumer disconnected
    pub async fn emit(&self, event: StreamEvent) -> bool {
        self.sender.send(event).await.is_ok()
    }

    /// Whether the consumer disconnected
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_offsets_cover_input() {
        let text = "abcdefghij";
        let events = partial_events(text, 4);
        assert_eq!(events.len(), 3);

        let mut rebuilt = String::new();
        for (i, event) in events.iter().enumerate() {
            let StreamEvent::Partial { data, .. } = event else {
                panic!("expected partial event");
            };
            assert_eq!(data.offset, rebuilt.len());
            assert_eq!(data.is_final, i == events.len() - 1);
            rebuilt.push_str(&data.chunk);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_partial_respects_char_boundaries() {
        let text = "ééééé";
        let events = partial_events(text, 3);
        let rebuilt: String = events
            .iter()
            .map(|e| match e {
                StreamEvent::Partial { data, .. } => data.chunk.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_frame_shape() {
        let frame = StreamEvent::data(json!({"ok": true})).to_frame();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        let body: Value = serde_json::from_str(frame.trim_start_matches("data: ").trim()).unwrap();
        assert_eq!(body["type"], "data");
        assert_eq!(body["data"]["ok"], true);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_sink_reports_disconnect() {
        let (sink, receiver) = EventSink::channel(1);
        drop(receiver);
        assert!(!sink.emit(StreamEvent::progress(0.0, "start")).await);
        assert!(sink.is_closed());
    }
}
