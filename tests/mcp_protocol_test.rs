// ABOUTME: MCP JSON-RPC protocol tests over the stdio transport
// ABOUTME: Runs full sessions through line-framed I/O and compares results with the REST transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{create_seeded_gateway, TEST_TOKEN};
use helpers::axum_test::AxumTestRequest;
use mcp_gateway::{
    jsonrpc::error_codes,
    tools::{KnowledgeStore, ToolInvoker},
    transport::stdio::StdioTransport,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Feed `messages` to a stdio transport one per line and collect every reply
async fn run_session(tools: Arc<dyn ToolInvoker>, messages: &[Value]) -> Vec<Value> {
    let mut input = String::new();
    for message in messages {
        input.push_str(&message.to_string());
        input.push('\n');
    }

    let mut output = Vec::new();
    StdioTransport::new(tools)
        .serve(input.as_bytes(), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn registry() -> Arc<dyn ToolInvoker> {
    Arc::new(mcp_gateway::tools::ToolRegistry::with_builtin_tools(Arc::new(
        KnowledgeStore::new(),
    )))
}

#[tokio::test]
async fn test_handshake_and_listing() {
    common::init_test_logging();
    let replies = run_session(
        registry(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2024-11-05"}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], "mcp-gateway");
    assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 10);
    assert_eq!(replies[2]["id"], 3);
    assert_eq!(replies[2]["result"], json!({}));
}

#[tokio::test]
async fn test_protocol_errors() {
    common::init_test_logging();
    let mut output = Vec::new();
    StdioTransport::new(registry())
        .serve(
            "{broken json\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"prompts/list\"}\n".as_bytes(),
            &mut output,
        )
        .await
        .unwrap();

    let replies: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(replies[0]["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[1]["error"]["code"], error_codes::METHOD_NOT_FOUND);
    assert_eq!(replies[1]["id"], 9);
}

#[tokio::test]
async fn test_tool_call_matches_rest_result() {
    let (app, resources) = create_seeded_gateway().await;

    let rest: Value = AxumTestRequest::post("/mcp/call")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "project_overview", "arguments": {}}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    let replies = run_session(
        Arc::clone(&resources.tools),
        &[json!({
            "jsonrpc": "2.0",
            "id": "po",
            "method": "tools/call",
            "params": {"name": "project_overview", "arguments": {}}
        })],
    )
    .await;

    let result = &replies[0]["result"];
    assert_eq!(result["isError"], false);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<Value>(text).unwrap(), rest);
}

#[tokio::test]
async fn test_tool_failures_are_flagged_content() {
    common::init_test_logging();
    let replies = run_session(
        registry(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "nope"}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"arguments": {}}}),
        ],
    )
    .await;

    for reply in &replies {
        assert!(reply.get("error").is_none());
        assert_eq!(reply["result"]["isError"], true);
    }
    let payload: Value =
        serde_json::from_str(replies[0]["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["error"], "tool_not_found");
}

#[tokio::test]
async fn test_duplex_session_answers_in_order() {
    common::init_test_logging();
    let (client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let transport = StdioTransport::new(registry());
    let serving = tokio::spawn(async move {
        transport
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut replies = BufReader::new(client_read).lines();

    for id in 1..=3 {
        let line = format!("{}\n", json!({"jsonrpc": "2.0", "id": id, "method": "ping"}));
        client_write.write_all(line.as_bytes()).await.unwrap();
        let reply: Value = serde_json::from_str(&replies.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply["id"], id);
    }

    client_write.shutdown().await.unwrap();
    serving.await.unwrap().unwrap();
}
