// ABOUTME: Gateway binary: loads configuration, builds shared resources, and serves one transport
// ABOUTME: HTTP serves OAuth, SSE, REST, and streaming together; stdio serves JSON-RPC on stdin/stdout
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # MCP Gateway Server Binary
//!
//! ```bash
//! MCP_AUTH_TOKEN=secret mcp-gateway --transport http --port 2068
//! mcp-gateway --transport stdio
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use mcp_gateway::{
    config::environment::ServerConfig,
    logging,
    mcp::{GatewayServer, ServerResources},
    tools::{KnowledgeStore, ToolRegistry},
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportMode {
    /// OAuth endpoints plus the SSE, REST, and streaming transports
    Http,
    /// Line-framed JSON-RPC on stdin/stdout
    Stdio,
}

#[derive(Parser)]
#[command(name = "mcp-gateway")]
#[command(about = "MCP gateway with an OAuth 2.1 authorization server", version)]
struct Args {
    /// Transport to serve
    #[arg(long, value_enum, default_value = "http")]
    transport: TransportMode,

    /// Override HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stderr only, so stdout stays a clean JSON-RPC channel in stdio mode
    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    config.validate()?;
    info!("{}", config.summary());

    let store = Arc::new(KnowledgeStore::seeded().await);
    let tools = Arc::new(ToolRegistry::with_builtin_tools(store));
    info!(tools = tools.len(), "Tool registry ready");

    let host = config.host.clone(); // Safe: config moves into resources
    let port = config.http_port;
    let resources = Arc::new(ServerResources::in_memory(config, tools).await?);
    let server = GatewayServer::new(resources);

    match args.transport {
        TransportMode::Http => server.run_http(&host, port).await,
        TransportMode::Stdio => server.run_stdio().await,
    }
}
