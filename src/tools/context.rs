// ABOUTME: Defines ToolExecutionContext which gives tools access to shared backing state.
// ABOUTME: Built once by the registry and lent to every tool execution.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::knowledge::KnowledgeStore;

/// Context provided to every tool execution.
#[derive(Clone)]
pub struct ToolExecutionContext {
    /// Knowledge store shared by all tools
    pub store: Arc<KnowledgeStore>,
}

impl ToolExecutionContext {
    /// Create a context over a shared store
    #[must_use]
    pub const fn new(store: Arc<KnowledgeStore>) -> Self {
        Self { store }
    }
}
