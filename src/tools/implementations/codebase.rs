// ABOUTME: Codebase tools: lookup of indexed codebases and capture of new ones.
// ABOUTME: Capture needs the external indexing backend and reports an execution error without it.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::Args;
use crate::errors::ToolError;
use crate::tools::context::ToolExecutionContext;
use crate::tools::traits::{McpTool, ToolCapabilities};

const PREVIEW_CHARS: usize = 500;

/// Look up indexed codebases and search their files.
pub struct GetCodebaseTool;

#[async_trait]
impl McpTool for GetCodebaseTool {
    fn name(&self) -> &'static str {
        "get_codebase"
    }

    fn description(&self) -> &'static str {
        "Retrieve codebase information and search code files using semantic search."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "codebase_id": {"type": "integer", "description": "Specific codebase ID"},
                "name": {"type": "string", "description": "Search by name"},
                "query": {"type": "string", "description": "Search code content"},
                "language": {"type": "string", "description": "Filter by language"},
                "limit": {"type": "integer", "description": "Maximum results"}
            }
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::READS_DATA
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let codebase_id = args.opt_id("codebase_id")?;
        let limit = args.limit(20)?;

        let codebases = context
            .store
            .find_codebases(codebase_id, args.opt_str("name")?, limit)
            .await;

        let code_files: Vec<Value> = match args.opt_str("query")? {
            Some(query) => context
                .store
                .search_code(query, codebase_id, args.opt_str("language")?, limit)
                .await
                .into_iter()
                .map(|file| {
                    json!({
                        "file_path": file.file_path,
                        "language": file.language,
                        "content_preview": file.content.chars().take(PREVIEW_CHARS).collect::<String>(),
                        "codebase_id": file.codebase_id,
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(json!({
            "success": true,
            "results": { "codebases": codebases, "code_files": code_files },
        }))
    }
}

/// Index a codebase from a local path.
pub struct CaptureCodebaseTool;

#[async_trait]
impl McpTool for CaptureCodebaseTool {
    fn name(&self) -> &'static str {
        "capture_codebase"
    }

    fn description(&self) -> &'static str {
        "Index a codebase from a local path for semantic search."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Name for the codebase"},
                "path": {"type": "string", "description": "Local path to the codebase"},
                "description": {"type": "string", "description": "Optional description"},
                "repo_url": {"type": "string", "description": "Git repository URL"}
            },
            "required": ["name", "path"]
        })
    }

    fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities::WRITES_DATA | ToolCapabilities::EXTERNAL_BACKEND
    }

    async fn execute(
        &self,
        args: Map<String, Value>,
        _context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let args = Args::new(self.name(), &args);
        let name = args.required_str("name")?;
        let path = args.required_str("path")?;

        tracing::warn!(codebase = %name, path = %path, "Codebase capture requested without an indexing backend");
        Err(ToolError::execution_failed(
            self.name(),
            "codebase indexing backend is not configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::tools::knowledge::KnowledgeStore;

    #[tokio::test]
    async fn test_capture_reports_execution_failure() {
        let ctx = ToolExecutionContext::new(Arc::new(KnowledgeStore::new()));
        let args = json!({"name": "gw", "path": "/srv/gw"}).as_object().cloned().unwrap();
        let err = CaptureCodebaseTool.execute(args, &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));

        let missing = Map::new();
        let err = CaptureCodebaseTool.execute(missing, &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_search_returns_previews() {
        let store = Arc::new(KnowledgeStore::new());
        store
            .add_codebase(
                "gateway",
                None,
                None,
                vec![("lib.rs".to_owned(), "rust".to_owned(), "pub fn gateway() {}".to_owned())],
            )
            .await;
        let ctx = ToolExecutionContext::new(store);
        let args = json!({"query": "gateway"}).as_object().cloned().unwrap();
        let result = GetCodebaseTool.execute(args, &ctx).await.unwrap();
        assert_eq!(result["results"]["codebases"][0]["name"], "gateway");
        assert_eq!(result["results"]["code_files"][0]["file_path"], "lib.rs");
    }
}
