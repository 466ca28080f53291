// ABOUTME: Module containing the built-in tool implementations organized by category.
// ABOUTME: Also hosts the argument accessors shared by every tool.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Tool Implementations
//!
//! - `memory` - `create_memory`, `get_memory`
//! - `codebase` - `get_codebase`, `capture_codebase`
//! - `overview` - `get_instructions`, `who_am_i_talking_to`, `project_overview`,
//!   `conversation_overview`, `get_knowledge_graph`
//! - `web` - `web_search`

/// Codebase lookup and capture
pub mod codebase;
/// Memory creation and retrieval
pub mod memory;
/// Read-only overviews of operator-managed data
pub mod overview;
/// Web search
pub mod web;

use serde_json::{Map, Value};

use crate::errors::ToolError;

/// Typed accessors over a tool's argument object
pub(crate) struct Args<'a> {
    tool: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    pub(crate) const fn new(tool: &'static str, map: &'a Map<String, Value>) -> Self {
        Self { tool, map }
    }

    fn invalid(&self, reason: String) -> ToolError {
        ToolError::invalid_arguments(self.tool, reason)
    }

    /// Optional string; non-string values are rejected
    pub(crate) fn opt_str(&self, key: &str) -> Result<Option<&'a str>, ToolError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(self.invalid(format!("'{key}' must be a string"))),
        }
    }

    /// Required non-blank string
    pub(crate) fn required_str(&self, key: &str) -> Result<&'a str, ToolError> {
        self.opt_str(key)?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| self.invalid(format!("'{key}' is required")))
    }

    /// Optional integer; numeric strings are accepted
    pub(crate) fn opt_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{key}' must be an integer"))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(format!("'{key}' must be an integer"))),
            Some(_) => Err(self.invalid(format!("'{key}' must be an integer"))),
        }
    }

    /// Optional id
    pub(crate) fn opt_id(&self, key: &str) -> Result<Option<u64>, ToolError> {
        self.opt_i64(key)?
            .map(|v| u64::try_from(v).map_err(|_| self.invalid(format!("'{key}' must be positive"))))
            .transpose()
    }

    /// Positive limit with a default
    pub(crate) fn limit(&self, default: usize) -> Result<usize, ToolError> {
        match self.opt_i64("limit")? {
            None => Ok(default),
            Some(v) => usize::try_from(v)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| self.invalid("'limit' must be a positive integer".to_owned())),
        }
    }

    /// Optional boolean; `"true"`/`"false"` strings are accepted
    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| self.invalid(format!("'{key}' must be a boolean"))),
            Some(_) => Err(self.invalid(format!("'{key}' must be a boolean"))),
        }
    }

    /// String list; a bare string counts as a one-element list
    pub(crate) fn str_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| self.invalid(format!("'{key}' must contain strings")))
                })
                .collect(),
            Some(_) => Err(self.invalid(format!("'{key}' must be a list of strings"))),
        }
    }

    /// Optional object
    pub(crate) fn object(&self, key: &str) -> Result<Map<String, Value>, ToolError> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(obj)) => Ok(obj.clone()),
            Some(_) => Err(self.invalid(format!("'{key}' must be an object"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_lenient_scalars() {
        let m = map(json!({"limit": "5", "flag": "true", "tags": "solo"}));
        let args = Args::new("t", &m);
        assert_eq!(args.limit(10).unwrap(), 5);
        assert!(args.bool_or("flag", false).unwrap());
        assert_eq!(args.str_list("tags").unwrap(), vec!["solo".to_owned()]);
    }

    #[test]
    fn test_rejections_name_the_field() {
        let m = map(json!({"limit": 0, "content": "  "}));
        let args = Args::new("t", &m);
        assert!(args.limit(10).unwrap_err().to_string().contains("limit"));
        assert!(args
            .required_str("content")
            .unwrap_err()
            .to_string()
            .contains("content"));
    }
}
