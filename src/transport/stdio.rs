// ABOUTME: Line-framed JSON-RPC transport over stdin and stdout
// ABOUTME: The process boundary is the trust boundary; logs go to stderr so stdout stays clean
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use super::Transport;
use crate::errors::{AppError, AppResult};
use crate::jsonrpc::{error_codes, JsonRpcResponse};
use crate::mcp::protocol::ProtocolHandler;
use crate::tools::ToolInvoker;

/// Handles stdio transport for MCP communication
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    /// Creates a new stdio transport instance
    #[must_use]
    pub fn new(tools: Arc<dyn ToolInvoker>) -> Self {
        Self {
            handler: ProtocolHandler::new(tools, Transport::Stdio),
        }
    }

    /// Serve the process's stdin and stdout until stdin closes
    ///
    /// # Errors
    /// Returns an error if reading stdin or writing stdout fails
    pub async fn run(&self) -> AppResult<()> {
        info!("MCP stdio transport ready - listening on stdin/stdout");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve any line reader and writer; one JSON message per line each way
    ///
    /// A line that is not valid UTF-8 gets a parse error reply and the
    /// session keeps reading.
    ///
    /// # Errors
    /// Returns an error if reading or writing fails
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .await
                .map_err(|e| AppError::internal("Failed to read stdin").with_source(e))?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buffer) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handler.handle_message(line.trim_end()).await,
                Err(e) => {
                    warn!("Discarding stdin line that is not valid UTF-8: {e}");
                    Some(JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        "Parse error",
                    ))
                }
            };

            if let Some(response) = response {
                Self::write_frame(&mut writer, &response).await?;
            }
        }

        info!("stdin closed, stdio transport stopping");
        Ok(())
    }

    async fn write_frame<W>(writer: &mut W, response: &JsonRpcResponse) -> AppResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut frame = serde_json::to_string(response)?;
        frame.push('\n');
        writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| AppError::internal("Failed to write stdout").with_source(e))?;
        writer
            .flush()
            .await
            .map_err(|e| AppError::internal("Failed to flush stdout").with_source(e))
    }
}
