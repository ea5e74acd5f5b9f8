//! Base trait and types for tools

use crate::tools::params::ToolParams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordinal hint for how expensive a tool is to run.
///
/// Callers may use this to decide what is worth caching or advertising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCost {
    #[default]
    Low,
    Medium,
    High,
}

impl PerformanceCost {
    /// Lowercase label for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Immutable descriptor attached to every tool.
///
/// The `name` is the registry's primary key; registering a second tool with
/// the same name replaces the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Unique tool name (lowercase with underscores, e.g. "read_file")
    pub name: String,
    /// Human-readable summary
    pub description: String,
    /// Grouping label, e.g. "file_operations"
    pub category: String,
    /// Workflow contexts in which the tool is advertised
    pub context_modes: Vec<String>,
    /// Whether the tool shells out to git
    pub requires_git: bool,
    /// Whether the tool touches the file system
    pub requires_filesystem: bool,
    /// Whether invocation may mutate files or repository state
    pub is_destructive: bool,
    /// Cost hint guiding cache priority decisions
    pub performance_cost: PerformanceCost,
}

impl ToolMetadata {
    /// Create metadata with the common defaults (no contexts, non-destructive,
    /// low cost)
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            context_modes: Vec::new(),
            requires_git: false,
            requires_filesystem: false,
            is_destructive: false,
            performance_cost: PerformanceCost::Low,
        }
    }

    /// Set the workflow contexts this tool appears in
    pub fn with_contexts(mut self, contexts: &[&str]) -> Self {
        self.context_modes = contexts.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Mark the tool as needing git
    pub fn with_git(mut self) -> Self {
        self.requires_git = true;
        self
    }

    /// Mark the tool as touching the file system
    pub fn with_filesystem(mut self) -> Self {
        self.requires_filesystem = true;
        self
    }

    /// Mark the tool as mutating external state
    pub fn destructive(mut self) -> Self {
        self.is_destructive = true;
        self
    }

    /// Set the performance cost hint
    pub fn with_cost(mut self, cost: PerformanceCost) -> Self {
        self.performance_cost = cost;
        self
    }
}

/// Error type for tool operations.
///
/// Every variant carries the tool name so the caller always knows which
/// operation failed.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under this name
    #[error("{tool_name}: tool not found")]
    NotFound { tool_name: String },

    /// Tool exists but is not usable in the requested context
    #[error("{tool_name}: cannot execute in context '{context}'")]
    InvalidContext { tool_name: String, context: String },

    /// Missing or invalid parameters
    #[error("{tool_name}: {message}")]
    Validation { tool_name: String, message: String },

    /// Failure inside `apply` or a hook
    #[error("{tool_name}: execution failed: {message}")]
    ExecutionFailed { tool_name: String, message: String },
}

impl ToolError {
    pub fn not_found(tool_name: impl Into<String>) -> Self {
        Self::NotFound {
            tool_name: tool_name.into(),
        }
    }

    pub fn invalid_context(tool_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidContext {
            tool_name: tool_name.into(),
            context: context.into(),
        }
    }

    pub fn validation(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    pub fn execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Name of the tool this error came from
    pub fn tool_name(&self) -> &str {
        match self {
            Self::NotFound { tool_name }
            | Self::InvalidContext { tool_name, .. }
            | Self::Validation { tool_name, .. }
            | Self::ExecutionFailed { tool_name, .. } => tool_name,
        }
    }
}

/// Base trait for all tools.
///
/// A tool is a named unit of functionality with validated parameters and a
/// string result. The registry treats all tools uniformly through this trait;
/// caching and hooks are optional capabilities expressed as defaulted methods.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor for this tool. Must be pure and stable across calls.
    fn metadata(&self) -> &ToolMetadata;

    /// The tool's unique name
    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Perform the tool's effect and return a result string.
    ///
    /// Receives parameters already normalized by [`Tool::validate`].
    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError>;

    /// Validate and normalize parameters before execution.
    ///
    /// Default implementation passes parameters through unchanged. Override
    /// to check required keys and resolve relative paths.
    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        Ok(params.clone())
    }

    /// Base cache key for this invocation, or `None` to decline caching.
    ///
    /// Must be a deterministic pure function of the validated parameters.
    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let _ = params;
        None
    }

    /// Files the result depends on, used for cache invalidation.
    ///
    /// A tool that defines a cache key should list every file whose content
    /// affects its result; invalidation correctness relies on this being
    /// complete.
    fn file_dependencies(&self, params: &ToolParams) -> Option<Vec<PathBuf>> {
        let _ = params;
        None
    }

    /// Whether the tool can run in the given workflow context.
    ///
    /// No context means unrestricted.
    fn can_execute(&self, context: Option<&str>) -> bool {
        match context {
            None => true,
            Some(c) => self.metadata().context_modes.iter().any(|m| m == c),
        }
    }

    /// Hook invoked immediately before `apply`. Not called on cache hits.
    async fn pre_execute(&self, params: &ToolParams) {
        let _ = params;
    }

    /// Hook invoked immediately after `apply`. Not called on cache hits.
    async fn post_execute(&self, result: &str, params: &ToolParams) {
        let _ = (result, params);
    }
}

/// Helper trait for tools that resolve paths against a project root
pub trait FileSystemTool: Tool {
    /// Root directory for resolving relative paths
    fn project_root(&self) -> &Path;

    /// Resolve a possibly-relative path against the project root
    fn resolve_path(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        metadata: ToolMetadata,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                metadata: ToolMetadata::new("echo", "Echo back a message", "testing")
                    .with_contexts(&["debugging"]),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
            Ok(params.get_string("message").unwrap_or_default())
        }
    }

    #[test]
    fn metadata_builder_defaults() {
        let meta = ToolMetadata::new("t", "d", "c");
        assert!(!meta.is_destructive);
        assert!(!meta.requires_git);
        assert_eq!(meta.performance_cost, PerformanceCost::Low);
        assert!(meta.context_modes.is_empty());
    }

    #[test]
    fn can_execute_respects_context_modes() {
        let tool = EchoTool::new();
        assert!(tool.can_execute(None));
        assert!(tool.can_execute(Some("debugging")));
        assert!(!tool.can_execute(Some("exploration")));
    }

    #[test]
    fn default_capabilities_are_absent() {
        let tool = EchoTool::new();
        let params = ToolParams::new();
        assert!(tool.cache_key(&params).is_none());
        assert!(tool.file_dependencies(&params).is_none());
    }

    #[test]
    fn error_display_prefixes_tool_name() {
        let err = ToolError::validation("read_file", "file_path parameter is required");
        assert_eq!(
            err.to_string(),
            "read_file: file_path parameter is required"
        );
        assert_eq!(err.tool_name(), "read_file");

        let err = ToolError::not_found("missing");
        assert_eq!(err.to_string(), "missing: tool not found");
    }
}
