// ABOUTME: Progress-streaming transport tests for POST /stream/execute
// ABOUTME: Checks event ordering, chunking, error delivery, and parity with the REST transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::{http::StatusCode, Router};
use common::{create_seeded_gateway, create_test_gateway, TEST_TOKEN};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

/// Run a streaming request to completion and decode every `data:` frame
async fn stream_events(app: &Router, body: &Value) -> Vec<Value> {
    let response = AxumTestRequest::post("/stream/execute")
        .bearer(TEST_TOKEN)
        .json(body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type").as_deref(),
        Some("text/event-stream")
    );
    assert_eq!(response.header("cache-control").as_deref(), Some("no-cache"));

    response
        .text()
        .split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .map(|frame| {
            let json = frame
                .strip_prefix("data: ")
                .unwrap_or_else(|| panic!("frame without data prefix: {frame}"));
            serde_json::from_str(json).unwrap()
        })
        .collect()
}

fn kinds(events: &[Value]) -> Vec<&str> {
    events
        .iter()
        .map(|event| event["type"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_success_event_order() {
    let (app, _resources) = create_test_gateway().await;
    let events = stream_events(&app, &json!({"tool_name": "get_memory", "arguments": {}})).await;

    assert_eq!(
        kinds(&events),
        ["progress", "progress", "progress", "data", "complete"]
    );
    let progress: Vec<f64> = events
        .iter()
        .filter_map(|event| event["progress"].as_f64())
        .collect();
    assert_eq!(progress, [0.0, 0.3, 0.9, 1.0]);
    assert!(events.iter().all(|event| event["timestamp"].is_string()));
}

#[tokio::test]
async fn test_terminal_data_matches_rest_payload() {
    let (app, _resources) = create_seeded_gateway().await;

    let rest: Value = AxumTestRequest::post("/mcp/call")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "get_instructions", "arguments": {}}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    let events = stream_events(
        &app,
        &json!({"tool_name": "get_instructions", "arguments": {}, "chunk_size": 64}),
    )
    .await;

    let data = events.iter().find(|event| event["type"] == "data").unwrap();
    assert_eq!(data["data"], rest);

    let rebuilt: String = events
        .iter()
        .filter(|event| event["type"] == "partial")
        .map(|event| event["data"]["chunk"].as_str().unwrap())
        .collect();
    assert_eq!(serde_json::from_str::<Value>(&rebuilt).unwrap(), rest);
}

#[tokio::test]
async fn test_single_string_array_arguments_match_rest() {
    let (app, _resources) = create_seeded_gateway().await;
    let arguments = json!({"query": ["rust"]});

    let rest: Value = AxumTestRequest::post("/mcp/call")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "get_memory", "arguments": arguments}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();

    let events = stream_events(
        &app,
        &json!({"tool_name": "get_memory", "arguments": arguments}),
    )
    .await;

    assert_eq!(
        kinds(&events),
        ["progress", "progress", "progress", "data", "complete"]
    );
    let data = events.iter().find(|event| event["type"] == "data").unwrap();
    assert_eq!(data["data"], rest);
}

#[tokio::test]
async fn test_small_results_are_not_chunked() {
    let (app, _resources) = create_test_gateway().await;
    let events = stream_events(
        &app,
        &json!({"tool_name": "get_memory", "chunk_size": 1_000_000}),
    )
    .await;
    assert!(events.iter().all(|event| event["type"] != "partial"));
}

#[tokio::test]
async fn test_unknown_tool_streams_error_then_complete() {
    let (app, _resources) = create_test_gateway().await;
    let events = stream_events(&app, &json!({"tool_name": "missing_tool"})).await;

    assert_eq!(kinds(&events), ["progress", "progress", "error", "complete"]);
    let error = &events[2]["data"];
    assert_eq!(error["error"], "tool_not_found");
    assert_eq!(error["tool_name"], "missing_tool");
}

#[tokio::test]
async fn test_invalid_arguments_skip_execution() {
    let (app, _resources) = create_test_gateway().await;
    let events = stream_events(
        &app,
        &json!({"tool_name": "get_memory", "arguments": "not an object"}),
    )
    .await;

    assert_eq!(kinds(&events), ["progress", "error", "complete"]);
    assert_eq!(events[1]["data"]["error"], "invalid_request");
}

#[tokio::test]
async fn test_stream_false_answers_like_rest() {
    let (app, _resources) = create_seeded_gateway().await;

    let plain: Value = AxumTestRequest::post("/stream/execute")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "get_instructions", "stream": false}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let rest: Value = AxumTestRequest::post("/mcp/call")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "get_instructions"}))
        .send(app.clone())
        .await
        .json();
    assert_eq!(plain, rest);

    AxumTestRequest::post("/stream/execute")
        .bearer(TEST_TOKEN)
        .json(&json!({"tool_name": "missing_tool", "stream": false}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_streaming_discovery_routes() {
    let (app, _resources) = create_test_gateway().await;

    let tools: Value = AxumTestRequest::get("/stream/tools")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(tools["streaming_supported"], true);
    assert_eq!(tools["count"], 10);

    let health: Value = AxumTestRequest::get("/stream/health")
        .send(app.clone())
        .await
        .json();
    assert_eq!(health["transport"], "streaming");
}
