// ABOUTME: Informational routes describing the server, its transports, and its endpoints
// ABOUTME: GET / is public, GET /info requires a bearer token, GET /docs is a plain-text guide
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::constants::{paths, protocol, service_names};
use crate::mcp::resources::ServerResources;
use crate::transport::Transport;

const DOCS: &str = "\
MCP Gateway

Authentication
  Send `Authorization: Bearer <token>` with either the static server token or an
  OAuth access token. OAuth clients discover the authorization server through
  /.well-known/oauth-protected-resource and /.well-known/oauth-authorization-server,
  register at /oauth/register, and use the authorization code flow with PKCE (S256).

Transports
  stdio      run the binary with `--transport stdio`; one JSON-RPC message per line
  SSE        GET /sse, then POST JSON-RPC to the endpoint announced in the first event
  REST       POST /tools/{name} with the arguments object, or POST /mcp/call
  streaming  POST /stream/execute {tool_name, arguments, stream, chunk_size}

Discovery
  GET /tools lists every tool with its input schema.
  GET /openapi.json describes every HTTP endpoint, one operation per tool.
";

/// Informational routes
pub struct InfoRoutes;

impl InfoRoutes {
    /// Create informational routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::handle_root))
            .route("/info", get(Self::handle_info))
            .route(paths::DOCS, get(Self::handle_docs))
            .with_state(resources)
    }

    async fn handle_root(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        Json(json!({
            "name": service_names::DISPLAY_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "status": "running",
            "tools": resources.tools.list_tools().len(),
            "docs": paths::DOCS,
            "openapi": paths::OPENAPI,
        }))
    }

    async fn handle_info(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Response {
        let base_url = resources.base_url(&headers);
        let principal = match resources
            .authenticator
            .require(&headers, &base_url, Transport::Rest.as_str())
            .await
        {
            Ok(principal) => principal,
            Err(challenge) => return challenge.into_response(),
        };

        Json(json!({
            "name": service_names::DISPLAY_NAME,
            "service": service_names::MCP_GATEWAY,
            "version": env!("CARGO_PKG_VERSION"),
            "protocol_version": protocol::MCP_PROTOCOL_VERSION,
            "principal": principal.label(),
            "transports": [
                Transport::Stdio.as_str(),
                Transport::Sse.as_str(),
                Transport::Rest.as_str(),
                Transport::Streaming.as_str(),
            ],
            "endpoints": {
                "authorization_server_metadata": format!("{base_url}{}", paths::AUTH_SERVER_METADATA),
                "protected_resource_metadata": format!("{base_url}{}", paths::PROTECTED_RESOURCE_METADATA),
                "authorize": format!("{base_url}{}", paths::AUTHORIZE),
                "token": format!("{base_url}{}", paths::TOKEN),
                "register": format!("{base_url}{}", paths::REGISTER),
                "revoke": format!("{base_url}{}", paths::REVOKE),
                "sse": format!("{base_url}{}", paths::SSE),
                "messages": format!("{base_url}{}", paths::MESSAGES),
                "tools": format!("{base_url}/tools"),
                "mcp_call": format!("{base_url}/mcp/call"),
                "stream": format!("{base_url}/stream/execute"),
                "openapi": format!("{base_url}{}", paths::OPENAPI),
            },
            "active_sse_sessions": resources.sse_manager.active_sessions(),
        }))
        .into_response()
    }

    async fn handle_docs() -> &'static str {
        DOCS
    }
}
