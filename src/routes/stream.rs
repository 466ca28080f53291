// ABOUTME: Streaming transport routes: POST /stream/execute plus its discovery and health endpoints
// ABOUTME: Streams progress, partial, data or error, and complete frames as text/event-stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::constants::{defaults, service_names};
use crate::errors::AppError;
use crate::mcp::resources::ServerResources;
use crate::transport::rest::{McpCallRequest, RestAdapter};
use crate::transport::streaming::{StreamExecuteRequest, StreamingAdapter};
use crate::transport::{Adapter, Transport};

/// Streaming transport routes
pub struct StreamRoutes;

impl StreamRoutes {
    /// Create streaming routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/stream", get(Self::handle_info))
            .route("/stream/tools", get(Self::handle_tools))
            .route("/stream/health", get(Self::handle_health))
            .route("/stream/execute", post(Self::handle_execute))
            .with_state(resources)
    }

    async fn handle_info() -> Json<Value> {
        Json(json!({
            "name": service_names::DISPLAY_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "transport": Transport::Streaming.as_str(),
            "features": ["progress-tracking", "chunked-responses"],
            "endpoints": {
                "stream": "/stream/execute",
                "tools": "/stream/tools",
                "health": "/stream/health",
            },
        }))
    }

    async fn handle_tools(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let tools = resources.tools.list_tools();
        Json(json!({
            "count": tools.len(),
            "tools": tools,
            "streaming_supported": true,
        }))
    }

    async fn handle_health() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "transport": Transport::Streaming.as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    }

    /// Execute a tool; `stream: false` answers exactly like `POST /mcp/call`
    async fn handle_execute(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<StreamExecuteRequest>, JsonRejection>,
    ) -> Response {
        let base_url = resources.base_url(&headers);
        if let Err(challenge) = resources
            .authenticator
            .require(&headers, &base_url, Transport::Streaming.as_str())
            .await
        {
            return challenge.into_response();
        }

        let request = match body {
            Ok(Json(request)) => request,
            Err(rejection) => return AppError::invalid_input(rejection.body_text()).into_response(),
        };

        if !request.stream {
            let (status, body) = RestAdapter
                .handle(
                    resources.tools.as_ref(),
                    McpCallRequest {
                        tool_name: request.tool_name,
                        arguments: request.arguments,
                    },
                )
                .await;
            return (status, Json(body)).into_response();
        }

        let receiver = StreamingAdapter::new(resources.config.transport.stream_chunk_size).spawn(
            Arc::clone(&resources.tools),
            request,
            defaults::EVENT_CHANNEL_CAPACITY,
        );
        let frames =
            ReceiverStream::new(receiver).map(|event| Ok::<_, Infallible>(event.to_frame()));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                (
                    header::HeaderName::from_static("x-accel-buffering"),
                    HeaderValue::from_static("no"),
                ),
            ],
            Body::from_stream(frames),
        )
            .into_response()
    }
}
