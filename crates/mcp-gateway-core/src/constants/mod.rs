// ABOUTME: Constants module with domain-separated organization
// ABOUTME: OAuth lifetimes, protocol identifiers, server defaults, and well-known paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Application constants grouped by domain.

/// OAuth 2.1 authorization server constants
pub mod oauth {
    /// Authorization code lifetime in seconds
    pub const AUTH_CODE_TTL_SECS: i64 = 600;
    /// Access token lifetime in seconds
    pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;
    /// Refresh token lifetime in days
    pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

    /// Random bytes in an authorization code
    pub const AUTH_CODE_BYTES: usize = 32;
    /// Random bytes in access and refresh tokens
    pub const TOKEN_BYTES: usize = 48;
    /// Random bytes in a generated client identifier
    pub const CLIENT_ID_BYTES: usize = 16;
    /// Random bytes in a generated client secret
    pub const CLIENT_SECRET_BYTES: usize = 32;

    /// Prefix for generated client identifiers
    pub const CLIENT_ID_PREFIX: &str = "mcp_";

    /// Scope granted when neither request nor client names one
    pub const DEFAULT_SCOPE: &str = "read write";
    /// Principal recorded on auto-approved authorizations
    pub const DEFAULT_USER_ID: &str = "mcp_user";
    /// Scopes advertised in discovery
    pub const SUPPORTED_SCOPES: [&str; 3] = ["read", "write", "admin"];

    /// Grant type identifiers
    pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
    /// Grant type identifier for refresh
    pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

    /// Token endpoint authentication for public clients
    pub const AUTH_METHOD_NONE: &str = "none";
    /// Token endpoint authentication for confidential clients
    pub const AUTH_METHOD_CLIENT_SECRET_POST: &str = "client_secret_post";

    /// Display name of the bootstrapped first-party client
    pub const FIRST_PARTY_CLIENT_NAME: &str = "Claude";
    /// Redirect URIs of the bootstrapped first-party client
    pub const FIRST_PARTY_REDIRECT_URIS: [&str; 2] = [
        "https://claude.ai/api/mcp/auth_callback",
        "https://claude.com/api/mcp/auth_callback",
    ];
}

/// Well-known and endpoint paths
pub mod paths {
    /// RFC 8414 authorization server metadata
    pub const AUTH_SERVER_METADATA: &str = "/.well-known/oauth-authorization-server";
    /// Protected resource metadata
    pub const PROTECTED_RESOURCE_METADATA: &str = "/.well-known/oauth-protected-resource";
    /// Authorization endpoint
    pub const AUTHORIZE: &str = "/oauth/authorize";
    /// Token endpoint
    pub const TOKEN: &str = "/oauth/token";
    /// Dynamic client registration endpoint
    pub const REGISTER: &str = "/oauth/register";
    /// Revocation endpoint
    pub const REVOKE: &str = "/oauth/revoke";
    /// SSE stream endpoint
    pub const SSE: &str = "/sse";
    /// SSE message POST endpoint
    pub const MESSAGES: &str = "/messages";
    /// Human documentation
    pub const DOCS: &str = "/docs";
    /// Generated `OpenAPI` document
    pub const OPENAPI: &str = "/openapi.json";
}

/// MCP protocol identifiers
pub mod protocol {
    /// MCP protocol revision spoken by the JSON-RPC transports
    pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
    /// JSON-RPC version string
    pub const JSONRPC_VERSION: &str = "2.0";
}

/// Service identity
pub mod service_names {
    /// Service name used in logs and server info
    pub const MCP_GATEWAY: &str = "mcp-gateway";
    /// Human-readable server name
    pub const DISPLAY_NAME: &str = "MCP Gateway";
}

/// Server defaults
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 2068;
    /// Default bind host
    pub const HOST: &str = "0.0.0.0";
    /// SSE keepalive interval in seconds
    pub const SSE_KEEPALIVE_SECS: u64 = 15;
    /// Streaming transport chunk size in bytes
    pub const STREAM_CHUNK_SIZE: usize = 1024;
    /// Capacity of per-session event channels
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
    /// How long an SSE message POST waits on a full session queue
    pub const SSE_DELIVERY_TIMEOUT_SECS: u64 = 5;
    /// Interval between expired-record sweeps in seconds
    pub const CLEANUP_INTERVAL_SECS: u64 = 300;
}
