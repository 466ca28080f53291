// ABOUTME: REST transport routes for tool discovery and stateless tool execution
// ABOUTME: GET /tools lists descriptors; POST /tools/:name and POST /mcp/call run one tool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::mcp::resources::ServerResources;
use crate::transport::rest::{McpCallRequest, RestAdapter};
use crate::transport::{Adapter, Transport};

/// REST tool routes
pub struct ToolRoutes;

impl ToolRoutes {
    /// Create tool listing and execution routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/tools", get(Self::handle_list_tools))
            .route("/tools/:tool_name", post(Self::handle_execute_tool))
            .route("/mcp/call", post(Self::handle_mcp_call))
            .with_state(resources)
    }

    async fn handle_list_tools(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let tools = resources.tools.list_tools();
        Json(json!({
            "count": tools.len(),
            "tools": tools,
        }))
    }

    /// Execute the tool named in the path with the body as its arguments
    async fn handle_execute_tool(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(tool_name): Path<String>,
        body: Bytes,
    ) -> Response {
        if let Err(challenge) = Self::authenticate(&resources, &headers).await {
            return challenge;
        }

        let arguments = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice(&body) {
                Ok(arguments) => arguments,
                Err(e) => {
                    return AppError::invalid_input(format!("Request body is not JSON: {e}"))
                        .into_response()
                }
            }
        };
        Self::execute(
            &resources,
            McpCallRequest {
                tool_name,
                arguments,
            },
        )
        .await
    }

    /// Execute `{tool_name, arguments}`
    async fn handle_mcp_call(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Result<Json<McpCallRequest>, JsonRejection>,
    ) -> Response {
        if let Err(challenge) = Self::authenticate(&resources, &headers).await {
            return challenge;
        }

        match body {
            Ok(Json(request)) => Self::execute(&resources, request).await,
            Err(rejection) => AppError::invalid_input(rejection.body_text()).into_response(),
        }
    }

    async fn authenticate(
        resources: &Arc<ServerResources>,
        headers: &HeaderMap,
    ) -> Result<(), Response> {
        resources
            .authenticator
            .require(headers, &resources.base_url(headers), Transport::Rest.as_str())
            .await
            .map(|_| ())
            .map_err(IntoResponse::into_response)
    }

    async fn execute(resources: &Arc<ServerResources>, request: McpCallRequest) -> Response {
        let (status, body) = RestAdapter.handle(resources.tools.as_ref(), request).await;
        (status, Json(body)).into_response()
    }
}
