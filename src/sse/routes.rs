// ABOUTME: SSE route handlers for the MCP push channel and its message POST endpoint
// ABOUTME: GET /sse announces the POST endpoint; POST /messages answers on the matching stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::constants::paths;
use crate::errors::AppError;
use crate::logging::AppLogger;
use crate::mcp::protocol::ProtocolHandler;
use crate::mcp::resources::ServerResources;
use crate::sse::DeliveryError;
use crate::middleware::AuthChallenge;
use crate::transport::Transport;

/// Query accepted by `GET /sse`
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Static token for clients that cannot set headers on an `EventSource`
    pub token: Option<String>,
}

/// Query accepted by `POST /messages`
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    /// Session announced in the stream's `endpoint` event
    pub session_id: Option<String>,
}

/// SSE routes implementation
pub struct SseRoutes;

impl SseRoutes {
    /// Create the stream and message routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(paths::SSE, get(Self::handle_stream))
            .route(paths::MESSAGES, post(Self::handle_message))
            .with_state(resources)
    }

    /// Open a push channel; the first event names the POST endpoint for this session
    async fn handle_stream(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<StreamQuery>,
    ) -> Response {
        let mut principal = resources.authenticator.authenticate_headers(&headers).await;
        if !principal.is_authenticated() {
            principal = resources
                .authenticator
                .authenticate_query_token(query.token.as_deref());
        }
        AppLogger::log_auth_event(
            &principal.label(),
            Transport::Sse.as_str(),
            principal.is_authenticated(),
        );
        if !principal.is_authenticated() {
            return AuthChallenge::new(&resources.base_url(&headers)).into_response();
        }

        let (guard, mut receiver) = resources.sse_manager.register(&principal.label());
        let endpoint = format!("{}?session_id={}", paths::MESSAGES, guard.session_id());

        let stream = async_stream::stream! {
            // Dropped with the stream when the client goes away
            let guard = guard;
            yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));

            while let Some(message) = receiver.recv().await {
                match Event::default().event("message").json_data(&message) {
                    Ok(event) => yield Ok(event),
                    Err(e) => tracing::warn!(
                        session_id = %guard.session_id(),
                        error = %e,
                        "Dropping unserializable SSE message"
                    ),
                }
            }
        };

        Sse::new(stream)
            .keep_alive(
                KeepAlive::new()
                    .interval(Duration::from_secs(resources.config.transport.sse_keepalive_secs)),
            )
            .into_response()
    }

    /// Accept one JSON-RPC message for a session; the answer goes out on the stream
    async fn handle_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<MessageQuery>,
        body: String,
    ) -> Response {
        let base_url = resources.base_url(&headers);
        if let Err(challenge) = resources
            .authenticator
            .require(&headers, &base_url, Transport::Sse.as_str())
            .await
        {
            return challenge.into_response();
        }

        let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
            return AppError::invalid_input("session_id query parameter is required")
                .into_response();
        };
        if !resources.sse_manager.contains(&session_id) {
            return AppError::not_found(format!("SSE session {session_id}")).into_response();
        }

        let handler = ProtocolHandler::new(Arc::clone(&resources.tools), Transport::Sse);
        if let Some(response) = handler.handle_message(&body).await {
            match resources.sse_manager.deliver(&session_id, response).await {
                Ok(()) => {}
                Err(DeliveryError::Stalled) => {
                    return AppError::unavailable(format!(
                        "SSE session {session_id} is not reading its stream"
                    ))
                    .into_response();
                }
                Err(e) => {
                    tracing::info!(session_id = %session_id, reason = ?e, "SSE session closed before delivery");
                    return AppError::not_found(format!("SSE session {session_id}"))
                        .into_response();
                }
            }
        }

        (StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))).into_response()
    }
}
