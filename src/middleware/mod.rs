// ABOUTME: HTTP middleware for authentication, CORS, and request correlation
// ABOUTME: Bearer authenticator shared by every transport plus request-id propagation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bearer authentication and challenge responses
pub mod auth;
/// CORS layer configuration
pub mod cors;
/// Request id propagation
pub mod request_id;

pub use auth::{
    extract_bearer, resolve_base_url, AuthChallenge, BearerAuthenticator, Principal,
};
pub use cors::setup_cors;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
