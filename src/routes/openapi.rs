// ABOUTME: OpenAPI document generated from the live tool catalogue and the gateway's fixed routes
// ABOUTME: Serves /openapi.json with one POST operation per tool plus the OAuth and transport endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! `OpenAPI` documentation route
//!
//! Tool input schemas are only known at runtime, so the document is assembled
//! per request from [`ToolInvoker::list_tools`] rather than derived at compile
//! time. Schemas are forwarded untouched.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use crate::constants::{paths, service_names};
use crate::mcp::resources::ServerResources;
use crate::models::ToolDescriptor;

/// `OpenAPI` routes provider
pub struct OpenApiRoutes;

impl OpenApiRoutes {
    /// Create the `OpenAPI` document route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::OPENAPI, get(Self::handle_openapi))
            .with_state(resources)
    }

    async fn handle_openapi(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Json<Value> {
        let base_url = resources.base_url(&headers);
        Json(openapi_document(&resources.tools.list_tools(), &base_url))
    }
}

/// Build the `OpenAPI` 3.1 document for `tools` served at `base_url`
#[must_use]
pub fn openapi_document(tools: &[ToolDescriptor], base_url: &str) -> Value {
    let mut paths = Map::new();

    for tool in tools {
        paths.insert(
            format!("/tools/{}", tool.name),
            json!({
                "post": {
                    "operationId": tool.name,
                    "summary": format!("Call tool: {}", tool.name),
                    "description": tool.description,
                    "tags": ["tools"],
                    "security": [{"bearerAuth": []}],
                    "requestBody": {
                        "required": false,
                        "content": {"application/json": {"schema": tool.input_schema}}
                    },
                    "responses": tool_responses()
                }
            }),
        );
    }

    insert_fixed_paths(&mut paths);

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": format!("{} API", service_names::DISPLAY_NAME),
            "version": env!("CARGO_PKG_VERSION"),
            "description": "HTTP access to MCP tools over REST and progress streaming, protected by OAuth 2.1 with PKCE",
            "license": {"name": "MIT OR Apache-2.0"}
        },
        "servers": [{"url": base_url}],
        "paths": paths,
        "components": {
            "securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer"}
            },
            "schemas": {
                "ToolError": {
                    "type": "object",
                    "required": ["error", "message"],
                    "properties": {
                        "error": {"type": "string"},
                        "message": {"type": "string"},
                        "tool_name": {"type": "string"}
                    }
                },
                "OAuthError": {
                    "type": "object",
                    "required": ["error"],
                    "properties": {
                        "error": {"type": "string"},
                        "error_description": {"type": "string"}
                    }
                }
            }
        }
    })
}

fn tool_responses() -> Value {
    let error = json!({"application/json": {"schema": {"$ref": "#/components/schemas/ToolError"}}});
    json!({
        "200": {"description": "Tool result", "content": {"application/json": {"schema": {}}}},
        "400": {"description": "Invalid arguments", "content": error},
        "401": {"description": "Missing or invalid bearer token"},
        "404": {"description": "Unknown tool", "content": error},
        "500": {"description": "Tool execution failed", "content": error}
    })
}

fn insert_fixed_paths(paths: &mut Map<String, Value>) {
    let oauth_error = json!({"application/json": {"schema": {"$ref": "#/components/schemas/OAuthError"}}});
    let form = |required: &[&str]| {
        json!({
            "required": true,
            "content": {"application/x-www-form-urlencoded": {"schema": {
                "type": "object",
                "required": required
            }}}
        })
    };

    let authorize_params: Vec<Value> = ["response_type", "client_id", "redirect_uri", "code_challenge"]
        .iter()
        .map(|name| json!({"name": name, "in": "query", "required": true, "schema": {"type": "string"}}))
        .collect();

    let fixed = [
        (
            "/tools",
            json!({"get": {
                "summary": "List tools with their input schemas",
                "tags": ["tools"],
                "security": [{"bearerAuth": []}],
                "responses": {"200": {"description": "Tool descriptors and count"}}
            }}),
        ),
        (
            "/mcp/call",
            json!({"post": {
                "summary": "Call a tool by name",
                "tags": ["tools"],
                "security": [{"bearerAuth": []}],
                "requestBody": {"required": true, "content": {"application/json": {"schema": {
                    "type": "object",
                    "required": ["tool_name"],
                    "properties": {"tool_name": {"type": "string"}, "arguments": {"type": "object"}}
                }}}},
                "responses": tool_responses()
            }}),
        ),
        (
            "/stream/execute",
            json!({"post": {
                "summary": "Call a tool and stream progress as server-sent events",
                "tags": ["streaming"],
                "security": [{"bearerAuth": []}],
                "requestBody": {"required": true, "content": {"application/json": {"schema": {
                    "type": "object",
                    "required": ["tool_name"],
                    "properties": {
                        "tool_name": {"type": "string"},
                        "arguments": {"type": "object"},
                        "stream": {"type": "boolean", "default": true},
                        "chunk_size": {"type": "integer", "minimum": 1}
                    }
                }}}},
                "responses": {
                    "200": {"description": "progress, partial, data or error, then complete", "content": {"text/event-stream": {}}},
                    "401": {"description": "Missing or invalid bearer token"}
                }
            }}),
        ),
        (
            paths::SSE,
            json!({"get": {
                "summary": "Open the MCP push channel",
                "tags": ["sse"],
                "security": [{"bearerAuth": []}],
                "responses": {"200": {"description": "endpoint event, then JSON-RPC responses", "content": {"text/event-stream": {}}}}
            }}),
        ),
        (
            paths::MESSAGES,
            json!({"post": {
                "summary": "Send a JSON-RPC message to an open SSE session",
                "tags": ["sse"],
                "security": [{"bearerAuth": []}],
                "parameters": [{"name": "session_id", "in": "query", "required": true, "schema": {"type": "string"}}],
                "responses": {
                    "202": {"description": "Accepted; the response arrives on the stream"},
                    "404": {"description": "Unknown session"}
                }
            }}),
        ),
        (
            paths::AUTHORIZE,
            json!({"get": {
                "summary": "Authorization endpoint (PKCE required)",
                "tags": ["oauth"],
                "parameters": authorize_params,
                "responses": {
                    "302": {"description": "Redirect carrying code and state, or an error"},
                    "400": {"description": "Untrusted redirect target", "content": oauth_error}
                }
            }}),
        ),
        (
            paths::TOKEN,
            json!({"post": {
                "summary": "Exchange an authorization code or refresh token",
                "tags": ["oauth"],
                "requestBody": form(&["grant_type", "client_id"]),
                "responses": {
                    "200": {"description": "Bearer token pair"},
                    "400": {"description": "Protocol error", "content": oauth_error},
                    "401": {"description": "Client authentication failed", "content": oauth_error}
                }
            }}),
        ),
        (
            paths::REGISTER,
            json!({"post": {
                "summary": "Dynamic client registration",
                "tags": ["oauth"],
                "requestBody": {"required": true, "content": {"application/json": {"schema": {
                    "type": "object",
                    "required": ["redirect_uris"],
                    "properties": {
                        "client_name": {"type": "string"},
                        "redirect_uris": {"type": "array", "items": {"type": "string"}},
                        "grant_types": {"type": "array", "items": {"type": "string"}},
                        "token_endpoint_auth_method": {"type": "string", "enum": ["none", "client_secret_post"]}
                    }
                }}}},
                "responses": {
                    "201": {"description": "Registered client"},
                    "400": {"description": "Invalid client metadata", "content": oauth_error}
                }
            }}),
        ),
        (
            paths::REVOKE,
            json!({"post": {
                "summary": "Revoke an access or refresh token",
                "tags": ["oauth"],
                "requestBody": form(&["token"]),
                "responses": {"200": {"description": "Always succeeds"}}
            }}),
        ),
        (
            paths::AUTH_SERVER_METADATA,
            json!({"get": {
                "summary": "Authorization server metadata",
                "tags": ["discovery"],
                "responses": {"200": {"description": "RFC 8414 metadata"}}
            }}),
        ),
        (
            paths::PROTECTED_RESOURCE_METADATA,
            json!({"get": {
                "summary": "Protected resource metadata",
                "tags": ["discovery"],
                "responses": {"200": {"description": "Resource and authorization servers"}}
            }}),
        ),
        (
            "/health",
            json!({"get": {
                "summary": "Health check",
                "tags": ["health"],
                "responses": {"200": {"description": "Service is healthy"}}
            }}),
        ),
    ];

    for (path, item) in fixed {
        paths.insert(path.to_owned(), item);
    }
}
