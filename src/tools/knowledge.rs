// ABOUTME: In-memory knowledge store backing the built-in demonstration tools
// ABOUTME: Holds memories, codebases, instructions, admin profiles, projects, conversations, and graph data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Knowledge Store
//!
//! Process-local backing store for the built-in tool catalogue. Production
//! deployments replace the whole invocation core; this store only exists so
//! the gateway runs end to end without an external database.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// Stored memory entry
#[derive(Debug, Clone, Serialize)]
pub struct Memory {
    /// Store-assigned id
    pub id: u64,
    /// Memory text
    pub content: String,
    /// One of `general`, `fact`, `reminder`, `context`, `preference`
    pub memory_type: String,
    /// Importance from 1 to 10
    pub importance: u8,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Caller-supplied metadata
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Fields for a new memory
#[derive(Debug, Clone)]
pub struct NewMemory {
    /// Memory text
    pub content: String,
    /// Memory category
    pub memory_type: String,
    /// Importance from 1 to 10
    pub importance: u8,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Caller-supplied metadata
    pub metadata: Map<String, Value>,
}

/// Filters for memory lookup
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    /// Case-insensitive substring of the content
    pub text: Option<String>,
    /// Exact memory type
    pub memory_type: Option<String>,
    /// Match any of these tags
    pub tags: Vec<String>,
    /// Maximum results
    pub limit: usize,
}

/// Indexed codebase summary
#[derive(Debug, Clone, Serialize)]
pub struct Codebase {
    /// Store-assigned id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Source repository
    pub repo_url: Option<String>,
    /// Dominant language
    pub language: Option<String>,
    /// Indexed file count
    pub file_count: usize,
    /// Last indexing time
    pub indexed_at: Option<DateTime<Utc>>,
}

/// Indexed source file
#[derive(Debug, Clone, Serialize)]
pub struct CodeFile {
    /// Owning codebase
    pub codebase_id: u64,
    /// Path relative to the codebase root
    pub file_path: String,
    /// Language tag
    pub language: String,
    /// File content
    pub content: String,
}

/// Operator-provided instruction
#[derive(Debug, Clone, Serialize)]
pub struct Instruction {
    /// Store-assigned id
    pub id: u64,
    /// Short title
    pub title: String,
    /// Instruction text
    pub content: String,
    /// Grouping category
    pub category: String,
    /// Higher sorts first
    pub priority: i32,
    /// Inactive instructions are hidden by default
    #[serde(skip)]
    pub is_active: bool,
}

/// Public profile of a server administrator
#[derive(Debug, Clone, Serialize)]
pub struct AdminProfile {
    /// Login name
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Contact address
    pub email: Option<String>,
    /// Short biography
    pub bio: Option<String>,
    /// IANA timezone
    pub timezone: Option<String>,
    /// Spoken languages
    pub languages: Vec<String>,
    /// Areas of expertise
    pub expertise: Vec<String>,
}

/// Managed project
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    /// Store-assigned id
    pub id: u64,
    /// Project name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// One of `active`, `completed`, `paused`, `archived`
    pub status: String,
    /// Higher sorts first
    pub priority: i32,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

/// Single message of a recorded conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    /// `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
    /// Send time
    pub timestamp: DateTime<Utc>,
}

/// Recorded conversation
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    /// Client session id
    pub session_id: String,
    /// Title
    pub title: Option<String>,
    /// Summary text
    pub summary: Option<String>,
    /// Participant names
    pub participants: Vec<String>,
    /// Messages in send order
    #[serde(skip)]
    pub messages: Vec<ConversationMessage>,
    /// Last update
    pub updated_at: DateTime<Utc>,
}

/// Knowledge graph node
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeNode {
    /// Store-assigned id
    pub id: u64,
    /// Node category
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node label
    pub title: String,
    /// Optional body
    pub content: Option<String>,
    /// Optional parent node
    pub parent_id: Option<u64>,
}

/// Knowledge graph edge
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEdge {
    /// Source node id
    pub source: u64,
    /// Target node id
    pub target: u64,
    /// Relationship label
    pub relationship: String,
    /// Edge weight
    pub weight: f64,
}

/// Shared, lock-protected knowledge store
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    next_id: AtomicU64,
    memories: RwLock<Vec<Memory>>,
    codebases: RwLock<Vec<Codebase>>,
    code_files: RwLock<Vec<CodeFile>>,
    instructions: RwLock<Vec<Instruction>>,
    admins: RwLock<Vec<AdminProfile>>,
    projects: RwLock<Vec<Project>>,
    conversations: RwLock<Vec<Conversation>>,
    nodes: RwLock<Vec<KnowledgeNode>>,
    edges: RwLock<Vec<KnowledgeEdge>>,
}

impl KnowledgeStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an operator profile and starter instructions
    pub async fn seeded() -> Self {
        let store = Self::new();

        store
            .add_instruction(
                "Use the knowledge base",
                "Check get_memory before asking the user to repeat context they already shared.",
                "general",
                10,
            )
            .await;
        store
            .add_instruction(
                "Record durable facts",
                "Store stable preferences and facts with create_memory using an importance of 7 or higher.",
                "memory",
                5,
            )
            .await;

        store
            .add_admin(AdminProfile {
                username: "admin".to_owned(),
                display_name: "Gateway Administrator".to_owned(),
                email: None,
                bio: Some("Operates this MCP gateway.".to_owned()),
                timezone: Some("UTC".to_owned()),
                languages: vec!["en".to_owned()],
                expertise: vec!["mcp".to_owned(), "oauth".to_owned()],
            })
            .await;

        store
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Insert a memory and mirror it as a `memory` graph node
    pub async fn create_memory(&self, new: NewMemory) -> Memory {
        let memory = Memory {
            id: self.allocate_id(),
            content: new.content,
            memory_type: new.memory_type,
            importance: new.importance,
            tags: new.tags,
            metadata: new.metadata,
            created_at: Utc::now(),
        };

        self.nodes.write().await.push(KnowledgeNode {
            id: self.allocate_id(),
            node_type: "memory".to_owned(),
            title: format!("memory #{}", memory.id),
            content: Some(memory.content.clone()), // Safe: node keeps its own copy
            parent_id: None,
        });
        self.memories.write().await.push(memory.clone()); // Safe: stored copy and returned copy
        memory
    }

    /// Memories matching the query, most important and most recent first
    pub async fn find_memories(&self, query: &MemoryQuery) -> Vec<Memory> {
        let needle = query.text.as_deref().map(str::to_lowercase);
        let mut matches: Vec<Memory> = self
            .memories
            .read()
            .await
            .iter()
            .filter(|m| {
                query
                    .memory_type
                    .as_deref()
                    .is_none_or(|t| m.memory_type == t)
            })
            .filter(|m| query.tags.is_empty() || m.tags.iter().any(|t| query.tags.contains(t)))
            .filter(|m| {
                needle
                    .as_deref()
                    .is_none_or(|n| m.content.to_lowercase().contains(n))
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        matches.truncate(query.limit);
        matches
    }

    /// Register an indexed codebase with its files
    pub async fn add_codebase(
        &self,
        name: &str,
        description: Option<String>,
        repo_url: Option<String>,
        files: Vec<(String, String, String)>,
    ) -> Codebase {
        let id = self.allocate_id();
        let language = files.first().map(|(_, lang, _)| lang.clone());
        let codebase = Codebase {
            id,
            name: name.to_owned(),
            description,
            repo_url,
            language,
            file_count: files.len(),
            indexed_at: Some(Utc::now()),
        };

        self.code_files
            .write()
            .await
            .extend(files.into_iter().map(|(file_path, language, content)| CodeFile {
                codebase_id: id,
                file_path,
                language,
                content,
            }));
        self.codebases.write().await.push(codebase.clone()); // Safe: stored copy and returned copy
        codebase
    }

    /// Codebases by id, name substring, or most recent first
    pub async fn find_codebases(&self, id: Option<u64>, name: Option<&str>, limit: usize) -> Vec<Codebase> {
        let codebases = self.codebases.read().await;
        let name = name.map(str::to_lowercase);
        codebases
            .iter()
            .rev()
            .filter(|c| id.is_none_or(|id| c.id == id))
            .filter(|c| {
                name.as_deref()
                    .is_none_or(|n| c.name.to_lowercase().contains(n))
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Code files containing `text`, optionally restricted by codebase and language
    pub async fn search_code(
        &self,
        text: &str,
        codebase_id: Option<u64>,
        language: Option<&str>,
        limit: usize,
    ) -> Vec<CodeFile> {
        let needle = text.to_lowercase();
        self.code_files
            .read()
            .await
            .iter()
            .filter(|f| codebase_id.is_none_or(|id| f.codebase_id == id))
            .filter(|f| language.is_none_or(|l| f.language.eq_ignore_ascii_case(l)))
            .filter(|f| f.content.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Add an instruction
    pub async fn add_instruction(&self, title: &str, content: &str, category: &str, priority: i32) {
        let id = self.allocate_id();
        self.instructions.write().await.push(Instruction {
            id,
            title: title.to_owned(),
            content: content.to_owned(),
            category: category.to_owned(),
            priority,
            is_active: true,
        });
    }

    /// Instructions by category, highest priority first
    pub async fn instructions(&self, category: Option<&str>, active_only: bool) -> Vec<Instruction> {
        let mut found: Vec<Instruction> = self
            .instructions
            .read()
            .await
            .iter()
            .filter(|i| !active_only || i.is_active)
            .filter(|i| category.is_none_or(|c| i.category == c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.priority.cmp(&a.priority));
        found
    }

    /// Add an administrator profile
    pub async fn add_admin(&self, profile: AdminProfile) {
        self.admins.write().await.push(profile);
    }

    /// All administrator profiles
    pub async fn admins(&self) -> Vec<AdminProfile> {
        self.admins.read().await.clone()
    }

    /// Add a project
    pub async fn add_project(&self, name: &str, status: &str, priority: i32, tags: Vec<String>) -> u64 {
        let id = self.allocate_id();
        self.projects.write().await.push(Project {
            id,
            name: name.to_owned(),
            description: None,
            status: status.to_owned(),
            priority,
            tags,
            updated_at: Utc::now(),
        });
        id
    }

    /// Projects by id and status, highest priority first
    pub async fn projects(&self, id: Option<u64>, status: Option<&str>) -> Vec<Project> {
        let mut found: Vec<Project> = self
            .projects
            .read()
            .await
            .iter()
            .filter(|p| id.is_none_or(|id| p.id == id))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        found
    }

    /// Record a conversation
    pub async fn add_conversation(&self, conversation: Conversation) {
        self.conversations.write().await.push(conversation);
    }

    /// Conversations by session id, most recent first
    pub async fn conversations(&self, session_id: Option<&str>, limit: usize) -> Vec<Conversation> {
        let mut found: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .iter()
            .filter(|c| session_id.is_none_or(|s| c.session_id == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        found.truncate(limit);
        found
    }

    /// Link two graph nodes
    pub async fn add_edge(&self, source: u64, target: u64, relationship: &str, weight: f64) {
        self.edges.write().await.push(KnowledgeEdge {
            source,
            target,
            relationship: relationship.to_owned(),
            weight,
        });
    }

    /// Nodes of the given type and every edge touching them
    pub async fn graph(&self, node_type: Option<&str>, limit: usize) -> (Vec<KnowledgeNode>, Vec<KnowledgeEdge>) {
        let nodes: Vec<KnowledgeNode> = self
            .nodes
            .read()
            .await
            .iter()
            .filter(|n| node_type.is_none_or(|t| n.node_type == t))
            .take(limit)
            .cloned()
            .collect();

        let edges = self
            .edges
            .read()
            .await
            .iter()
            .filter(|e| nodes.iter().any(|n| n.id == e.source || n.id == e.target))
            .cloned()
            .collect();

        (nodes, edges)
    }
}
