// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, oauth};
use crate::oauth2_server::secrets;
use crate::oauth2_server::{OAuth2ServerSettings, RefreshPolicy};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational (default)
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Environment type for security and other configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Credentials of the first-party client provisioned at startup
#[derive(Clone)]
pub struct FirstPartyClientConfig {
    /// Fixed client id
    pub client_id: String,
    /// Plaintext secret, hashed before storage
    pub client_secret: String,
}

impl std::fmt::Debug for FirstPartyClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirstPartyClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// OAuth 2.1 authorization server settings
#[derive(Debug, Clone)]
pub struct OAuthServerConfig {
    /// Principal recorded on auto-approved authorizations
    pub default_user_id: String,
    /// Scope used when neither request nor client names one
    pub default_scope: String,
    /// Authorization code lifetime in seconds
    pub code_ttl_secs: i64,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Fate of the previous access token on refresh
    pub refresh_policy: RefreshPolicy,
    /// Bootstrap client, when configured
    pub first_party_client: Option<FirstPartyClientConfig>,
}

/// Transport tunables
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// SSE keepalive interval in seconds
    pub sse_keepalive_secs: u64,
    /// Streaming transport partial chunk size in bytes
    pub stream_chunk_size: usize,
    /// Interval between expired-record sweeps in seconds
    pub cleanup_interval_secs: u64,
}

/// Server configuration loaded from the environment
#[derive(Clone)]
pub struct ServerConfig {
    /// HTTP port for every network transport
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Externally visible base URL; derived from request headers when unset
    pub public_base_url: Option<String>,
    /// Static shared bearer secret
    pub auth_token: String,
    /// Whether `auth_token` was generated because none was configured
    pub auth_token_generated: bool,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Allowed CORS origins, `*` for any
    pub cors_allowed_origins: Vec<String>,
    /// Authorization server settings
    pub oauth: OAuthServerConfig,
    /// Transport settings
    pub transport: TransportConfig,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("host", &self.host)
            .field("public_base_url", &self.public_base_url)
            .field("auth_token", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .field("environment", &self.environment)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("oauth", &self.oauth)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            public_base_url: None,
            auth_token: String::new(),
            auth_token_generated: false,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            cors_allowed_origins: vec!["*".to_owned()],
            oauth: OAuthServerConfig {
                default_user_id: oauth::DEFAULT_USER_ID.to_owned(),
                default_scope: oauth::DEFAULT_SCOPE.to_owned(),
                code_ttl_secs: oauth::AUTH_CODE_TTL_SECS,
                access_token_ttl_secs: oauth::ACCESS_TOKEN_TTL_SECS,
                refresh_token_ttl_days: oauth::REFRESH_TOKEN_TTL_DAYS,
                refresh_policy: RefreshPolicy::Grace,
                first_party_client: None,
            },
            transport: TransportConfig {
                sse_keepalive_secs: defaults::SSE_KEEPALIVE_SECS,
                stream_chunk_size: defaults::STREAM_CHUNK_SIZE,
                cleanup_interval_secs: defaults::CLEANUP_INTERVAL_SECS,
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but malformed, or if the
    /// resulting configuration fails [`Self::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let port_default = env::var("MCP_PORT").unwrap_or_else(|_| defaults::HTTP_PORT.to_string());
        let (auth_token, auth_token_generated) = match env::var("MCP_AUTH_TOKEN") {
            Ok(token) if !token.trim().is_empty() => (token, false),
            _ => {
                warn!("MCP_AUTH_TOKEN not set; generated a random static token for this process");
                (secrets::generate_hex_string(32)?, true)
            }
        };

        let first_party_client = match (env::var("CLAUDE_CLIENT_ID"), env::var("CLAUDE_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) if !client_id.is_empty() => {
                Some(FirstPartyClientConfig {
                    client_id,
                    client_secret,
                })
            }
            (Ok(_), Err(_)) => {
                warn!("CLAUDE_CLIENT_ID is set without CLAUDE_CLIENT_SECRET; first-party client disabled");
                None
            }
            _ => None,
        };

        let config = Self {
            http_port: parse_var("HTTP_PORT", &port_default)?,
            host: env_var_or("HOST", defaults::HOST),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_owned())
                .filter(|url| !url.is_empty()),
            auth_token,
            auth_token_generated,
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            cors_allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            oauth: OAuthServerConfig {
                default_user_id: env_var_or("OAUTH_DEFAULT_USER_ID", oauth::DEFAULT_USER_ID),
                default_scope: env_var_or("OAUTH_DEFAULT_SCOPE", oauth::DEFAULT_SCOPE),
                code_ttl_secs: parse_var(
                    "OAUTH_CODE_TTL_SECS",
                    &oauth::AUTH_CODE_TTL_SECS.to_string(),
                )?,
                access_token_ttl_secs: parse_var(
                    "OAUTH_ACCESS_TOKEN_TTL_SECS",
                    &oauth::ACCESS_TOKEN_TTL_SECS.to_string(),
                )?,
                refresh_token_ttl_days: parse_var(
                    "OAUTH_REFRESH_TOKEN_TTL_DAYS",
                    &oauth::REFRESH_TOKEN_TTL_DAYS.to_string(),
                )?,
                refresh_policy: parse_var("REFRESH_POLICY", "grace")?,
                first_party_client,
            },
            transport: TransportConfig {
                sse_keepalive_secs: parse_var(
                    "SSE_KEEPALIVE_SECS",
                    &defaults::SSE_KEEPALIVE_SECS.to_string(),
                )?,
                stream_chunk_size: parse_var(
                    "STREAM_CHUNK_SIZE",
                    &defaults::STREAM_CHUNK_SIZE.to_string(),
                )?,
                cleanup_interval_secs: parse_var(
                    "CLEANUP_INTERVAL_SECS",
                    &defaults::CLEANUP_INTERVAL_SECS.to_string(),
                )?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            return Err(anyhow!("MCP_AUTH_TOKEN must not be empty"));
        }
        if self.oauth.code_ttl_secs <= 0
            || self.oauth.access_token_ttl_secs <= 0
            || self.oauth.refresh_token_ttl_days <= 0
        {
            return Err(anyhow!("OAuth lifetimes must be positive"));
        }
        if self.transport.stream_chunk_size == 0 {
            return Err(anyhow!("STREAM_CHUNK_SIZE must be greater than zero"));
        }
        if self.transport.sse_keepalive_secs == 0 {
            return Err(anyhow!("SSE_KEEPALIVE_SECS must be greater than zero"));
        }
        if let Some(base_url) = &self.public_base_url {
            url::Url::parse(base_url)
                .with_context(|| format!("PUBLIC_BASE_URL is not a valid URL: {base_url}"))?;
        }
        if self.cors_allowed_origins.is_empty() {
            return Err(anyhow!("CORS_ALLOWED_ORIGINS must name at least one origin or '*'"));
        }
        if self.environment.is_production() && self.auth_token_generated {
            warn!("Running in production with a generated MCP_AUTH_TOKEN; clients cannot know it");
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "MCP Gateway Configuration:\n\
             - Bind: {}:{}\n\
             - Public Base URL: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Static Token: {}\n\
             - First-party Client: {}\n\
             - Refresh Policy: {:?}\n\
             - CORS Origins: {}\n\
             - SSE Keepalive: {}s\n\
             - Stream Chunk Size: {} bytes",
            self.host,
            self.http_port,
            self.public_base_url.as_deref().unwrap_or("(derived from request)"),
            self.environment,
            self.log_level,
            if self.auth_token_generated {
                "Generated"
            } else {
                "Configured"
            },
            self.oauth
                .first_party_client
                .as_ref()
                .map_or("Disabled", |_| "Enabled"),
            self.oauth.refresh_policy,
            self.cors_allowed_origins.join(", "),
            self.transport.sse_keepalive_secs,
            self.transport.stream_chunk_size,
        )
    }

    /// Settings handed to the authorization server
    #[must_use]
    pub fn oauth_settings(&self) -> OAuth2ServerSettings {
        OAuth2ServerSettings {
            default_user_id: self.oauth.default_user_id.clone(), // Safe: String ownership for settings
            default_scope: self.oauth.default_scope.clone(), // Safe: String ownership for settings
            code_ttl_secs: self.oauth.code_ttl_secs,
            access_token_ttl_secs: self.oauth.access_token_ttl_secs,
            refresh_token_ttl_days: self.oauth.refresh_token_ttl_days,
            refresh_policy: self.oauth.refresh_policy,
        }
    }

    /// Configuration for tests and embedding: defaults plus a known static token
    #[must_use]
    pub fn for_static_token(auth_token: &str) -> Self {
        Self {
            auth_token: auth_token.to_owned(),
            environment: Environment::Testing,
            ..Self::default()
        }
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env_var_or(key, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("error"), LogLevel::Error);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("invalid"), LogLevel::Info);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::for_static_token("secret");
        assert!(config.validate().is_ok());

        config.transport.stream_chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::for_static_token("secret");
        config.public_base_url = Some("not a url".to_owned());
        assert!(config.validate().is_err());

        assert!(ServerConfig::for_static_token("").validate().is_err());
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = ServerConfig::for_static_token("super-secret-value");
        assert!(!config.summary().contains("super-secret-value"));
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }
}
