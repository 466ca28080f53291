// ABOUTME: Unified error handling with standard error codes and HTTP response formatting
// ABOUTME: Defines AppError, ErrorCode, and the JSON error body shared by every HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Centralized error handling for the gateway. Every module reports failures
//! as an [`AppError`] carrying a machine-readable [`ErrorCode`]; HTTP surfaces
//! render it as an [`ErrorResponse`] with the matching status code.
//!
//! OAuth protocol errors have their own wire shape (RFC 6749 section 5.2) and
//! live next to the authorization server, not here.

/// Tool invocation errors
pub mod tool;

pub use tool::ToolError;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No credentials presented on a protected endpoint
    #[serde(rename = "unauthorized")]
    Unauthorized,
    /// Credentials presented but rejected
    #[serde(rename = "invalid_token")]
    AuthInvalid,

    // Validation
    /// Malformed or missing request parameter
    #[serde(rename = "invalid_request")]
    InvalidInput,

    // Resources
    /// Requested resource does not exist
    #[serde(rename = "not_found")]
    ResourceNotFound,
    /// Resource already exists
    #[serde(rename = "conflict")]
    ResourceAlreadyExists,

    // Tool invocation
    /// Named tool is not registered with the invocation core
    #[serde(rename = "tool_not_found")]
    ToolNotFound,
    /// Tool raised an error while executing
    #[serde(rename = "tool_execution_error")]
    ToolExecutionError,

    // Capacity
    /// A downstream consumer is not keeping up
    #[serde(rename = "service_unavailable")]
    ServiceUnavailable,

    // Configuration
    /// Configuration missing or invalid
    #[serde(rename = "config_error")]
    ConfigError,

    // Internal
    /// Unexpected server-side failure
    #[serde(rename = "internal_error")]
    InternalError,
    /// Storage backend failure
    #[serde(rename = "storage_error")]
    StorageError,
    /// Serialization or deserialization failure
    #[serde(rename = "serialization_error")]
    SerializationError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Unauthorized | Self::AuthInvalid => 401,
            Self::ResourceNotFound | Self::ToolNotFound => 404,
            Self::ResourceAlreadyExists => 409,
            Self::ToolExecutionError
            | Self::ConfigError
            | Self::InternalError
            | Self::StorageError
            | Self::SerializationError => 500,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ToolNotFound => "The requested tool does not exist",
            Self::ToolExecutionError => "The tool failed while executing",
            Self::ServiceUnavailable => "The service is temporarily unable to accept the request",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Wire identifier for this code, identical to its serde name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::AuthInvalid => "invalid_token",
            Self::InvalidInput => "invalid_request",
            Self::ResourceNotFound => "not_found",
            Self::ResourceAlreadyExists => "conflict",
            Self::ToolNotFound => "tool_not_found",
            Self::ToolExecutionError => "tool_execution_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::ConfigError => "config_error",
            Self::InternalError => "internal_error",
            Self::StorageError => "storage_error",
            Self::SerializationError => "serialization_error",
        }
    }
}

/// Unified error type for the gateway
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional machine-readable details
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::Unauthorized, "Authentication required")
    }

    /// Invalid authentication
    #[must_use]
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource already exists
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Temporarily unable to accept work
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Storage backend error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: ErrorCode,
    /// Human-readable description
    pub message: String,
    /// Optional structured details
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: error.code,
            message: error.message,
            details: error.details,
        }
    }
}

impl From<ToolError> for AppError {
    fn from(error: ToolError) -> Self {
        let code = error.code();
        let tool_name = error.tool_name().to_owned();
        Self::new(code, error.to_string())
            .with_details(serde_json::json!({ "tool_name": tool_name }))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(feature = "http-response")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.http_status())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code = self.code.as_str(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = self.code.as_str(), error = %self, "Request rejected");
        }
        (status, axum::Json(ErrorResponse::from(self))).into_response()
    }
}
