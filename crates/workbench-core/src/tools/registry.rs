//! Tool registry: name resolution, context filtering, and the execute
//! pipeline
//!
//! The registry owns one instance per tool name and coordinates every
//! invocation: validate, consult the cache, run hooks and `apply`, store the
//! result. It is constructed with an injected [`CacheManager`]; there is no
//! global registry or cache.

use crate::tools::base::{Tool, ToolError, ToolMetadata};
use crate::tools::cache::CacheManager;
use crate::tools::params::ToolParams;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Context buckets every registry starts with. Registering a tool with an
/// unknown context mode creates a new bucket on the fly.
pub const DEFAULT_CONTEXTS: [&str; 4] = ["exploration", "debugging", "refactoring", "general"];

/// Central registry for managing and dispatching tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, for stable listing
    order: Vec<String>,
    /// Context mode -> tool names, in registration order
    contexts: HashMap<String, Vec<String>>,
    cache: Arc<CacheManager>,
}

impl ToolRegistry {
    /// Create a registry backed by the given cache
    pub fn new(cache: Arc<CacheManager>) -> Self {
        let contexts = DEFAULT_CONTEXTS
            .iter()
            .map(|c| (c.to_string(), Vec::new()))
            .collect();
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            contexts,
            cache,
        }
    }

    /// The cache this registry consults
    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Register a tool under its metadata name.
    ///
    /// Last registration wins for a given name. Bucket entries left behind by
    /// a previous registration's context modes are not scrubbed.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let metadata = tool.metadata().clone();

        if !self.tools.contains_key(&metadata.name) {
            self.order.push(metadata.name.clone());
        }
        for context in &metadata.context_modes {
            let bucket = self.contexts.entry(context.clone()).or_default();
            if !bucket.contains(&metadata.name) {
                bucket.push(metadata.name.clone());
            }
        }

        info!(tool = %metadata.name, contexts = ?metadata.context_modes, "registered tool");
        self.tools.insert(metadata.name, tool);
    }

    /// Register several tools at once
    pub fn register_all(&mut self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Get a tool instance by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tool names, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// List tool metadata, optionally filtered by context.
    ///
    /// A known context returns the tools registered under it; an unknown
    /// context (or none) returns every tool. Order is registration order.
    pub fn list(&self, context: Option<&str>) -> Vec<ToolMetadata> {
        let names: &Vec<String> = match context.and_then(|c| self.contexts.get(c)) {
            Some(bucket) => bucket,
            None => &self.order,
        };
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.metadata().clone())
            .collect()
    }

    /// All tools in a category
    pub fn tools_by_category(&self, category: &str) -> Vec<ToolMetadata> {
        self.list(None)
            .into_iter()
            .filter(|m| m.category == category)
            .collect()
    }

    /// All tools that may mutate files or repository state
    pub fn destructive_tools(&self) -> Vec<ToolMetadata> {
        self.list(None)
            .into_iter()
            .filter(|m| m.is_destructive)
            .collect()
    }

    /// Execute a tool by name.
    ///
    /// Pipeline: resolve, context check, validate, cache lookup, hooks and
    /// `apply` on a miss, cache store. Hooks only fire around real execution;
    /// a cache hit returns immediately.
    pub async fn execute(
        &self,
        name: &str,
        context: Option<&str>,
        params: &ToolParams,
    ) -> Result<String, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;

        if !tool.can_execute(context) {
            return Err(ToolError::invalid_context(
                name,
                context.unwrap_or_default(),
            ));
        }

        let params = tool.validate(params)?;

        let cache_key = tool.cache_key(&params);
        if let Some(base_key) = &cache_key {
            let deps = tool.file_dependencies(&params);
            if let Some(cached) = self.cache.get(base_key, deps.as_deref()).await {
                debug!(tool = name, "returning cached result");
                return Ok(cached);
            }
        }

        tool.pre_execute(&params).await;
        let result = tool.apply(&params).await?;
        tool.post_execute(&result, &params).await;

        if let Some(base_key) = &cache_key {
            // Recompute dependencies: execution or hooks may have changed
            // file state since the pre-check.
            let deps = tool.file_dependencies(&params);
            self.cache.set(base_key, &result, deps.as_deref()).await;
        }

        Ok(result)
    }

    /// Registry statistics
    pub fn stats(&self) -> RegistryStats {
        let mut tools_by_category: HashMap<String, usize> = HashMap::new();
        for tool in self.tools.values() {
            *tools_by_category
                .entry(tool.metadata().category.clone())
                .or_insert(0) += 1;
        }
        RegistryStats {
            total_tools: self.tools.len(),
            tools_by_category,
        }
    }
}

/// Statistics about the tool registry
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Total number of registered tools
    pub total_tools: usize,
    /// Number of tools in each category
    pub tools_by_category: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::ToolMetadata;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Test double with a counting `apply` and configurable caching
    struct CountingTool {
        metadata: ToolMetadata,
        apply_calls: AtomicUsize,
        cache_key: Option<String>,
        dependencies: Vec<PathBuf>,
        output: String,
    }

    impl CountingTool {
        fn new(name: &str, contexts: &[&str]) -> Self {
            Self {
                metadata: ToolMetadata::new(name, "test tool", "testing").with_contexts(contexts),
                apply_calls: AtomicUsize::new(0),
                cache_key: None,
                dependencies: Vec::new(),
                output: "ok".to_string(),
            }
        }

        fn cached(mut self, key: &str, deps: Vec<PathBuf>) -> Self {
            self.cache_key = Some(key.to_string());
            self.dependencies = deps;
            self
        }

        fn with_output(mut self, output: &str) -> Self {
            self.output = output.to_string();
            self
        }

        fn calls(&self) -> usize {
            self.apply_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        async fn apply(&self, _params: &ToolParams) -> Result<String, ToolError> {
            self.apply_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }

        fn cache_key(&self, _params: &ToolParams) -> Option<String> {
            self.cache_key.clone()
        }

        fn file_dependencies(&self, _params: &ToolParams) -> Option<Vec<PathBuf>> {
            if self.dependencies.is_empty() {
                None
            } else {
                Some(self.dependencies.clone())
            }
        }
    }

    /// Tool whose validation always rejects
    struct RejectingTool {
        metadata: ToolMetadata,
    }

    #[async_trait]
    impl Tool for RejectingTool {
        fn metadata(&self) -> &ToolMetadata {
            &self.metadata
        }

        fn validate(&self, _params: &ToolParams) -> Result<ToolParams, ToolError> {
            Err(ToolError::validation(
                &self.metadata.name,
                "file_path parameter is required",
            ))
        }

        async fn apply(&self, _params: &ToolParams) -> Result<String, ToolError> {
            unreachable!("apply must not run when validation fails");
        }
    }

    fn registry_in(dir: &TempDir) -> ToolRegistry {
        ToolRegistry::new(Arc::new(CacheManager::new(dir.path().join("cache"), 100)))
    }

    #[tokio::test]
    async fn distinct_names_both_retrievable() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(CountingTool::new("alpha", &["general"])));
        registry.register(Arc::new(CountingTool::new("beta", &["debugging"])));

        assert!(registry.get("alpha").is_some());
        assert!(registry.get("beta").is_some());

        let listed: Vec<String> = registry.list(None).into_iter().map(|m| m.name).collect();
        assert_eq!(listed, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn context_filtering() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(CountingTool::new("dbg_only", &["debugging"])));

        let debugging: Vec<String> = registry
            .list(Some("debugging"))
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(debugging, vec!["dbg_only"]);

        assert!(registry.list(Some("exploration")).is_empty());

        // Unknown context falls back to the full listing.
        assert_eq!(registry.list(Some("no_such_context")).len(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_touching_cache() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);

        let err = registry
            .execute("missing", None, &ToolParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));

        let stats = registry.cache().stats().await;
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn context_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(CountingTool::new("dbg_only", &["debugging"])));

        let err = registry
            .execute("dbg_only", Some("exploration"), &ToolParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidContext { .. }));
        assert!(err.to_string().contains("exploration"));
    }

    #[tokio::test]
    async fn validation_error_propagates_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(RejectingTool {
            metadata: ToolMetadata::new("strict", "always rejects", "testing"),
        }));

        let err = registry
            .execute("strict", None, &ToolParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "strict: file_path parameter is required");
    }

    #[tokio::test]
    async fn cache_hit_skips_apply_and_content_change_reruns() {
        let dir = TempDir::new().unwrap();
        let dep = dir.path().join("watched.txt");
        tokio::fs::write(&dep, "v1").await.unwrap();

        let tool = Arc::new(
            CountingTool::new("cached", &["general"])
                .cached("cached:fixed", vec![dep.clone()])
                .with_output("expensive result"),
        );
        let mut registry = registry_in(&dir);
        registry.register(tool.clone());

        let params = ToolParams::new();

        // First run: miss, apply executes.
        let first = registry.execute("cached", None, &params).await.unwrap();
        assert_eq!(first, "expensive result");
        assert_eq!(tool.calls(), 1);

        // Second run: hit, apply not re-invoked, identical result.
        let second = registry.execute("cached", None, &params).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(tool.calls(), 1);

        // Dependency changed: miss again, apply re-runs.
        tokio::fs::write(&dep, "v2").await.unwrap();
        registry.execute("cached", None, &params).await.unwrap();
        assert_eq!(tool.calls(), 2);
    }

    #[tokio::test]
    async fn uncached_tool_runs_every_time() {
        let dir = TempDir::new().unwrap();
        let tool = Arc::new(CountingTool::new("plain", &["general"]));
        let mut registry = registry_in(&dir);
        registry.register(tool.clone());

        registry
            .execute("plain", None, &ToolParams::new())
            .await
            .unwrap();
        registry
            .execute("plain", None, &ToolParams::new())
            .await
            .unwrap();
        assert_eq!(tool.calls(), 2);
    }

    #[tokio::test]
    async fn duplicate_registration_last_wins() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(
            CountingTool::new("dup", &["general"]).with_output("old"),
        ));
        registry.register(Arc::new(
            CountingTool::new("dup", &["general"]).with_output("new"),
        ));

        let result = registry
            .execute("dup", None, &ToolParams::new())
            .await
            .unwrap();
        assert_eq!(result, "new");

        // One listing entry, not two.
        assert_eq!(registry.list(None).len(), 1);
        assert_eq!(registry.list(Some("general")).len(), 1);
    }

    #[tokio::test]
    async fn category_and_destructive_filters() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);
        registry.register(Arc::new(CountingTool::new("safe", &["general"])));

        let destructive = CountingTool {
            metadata: ToolMetadata::new("nuke", "rewrites things", "file_operations")
                .with_contexts(&["general"])
                .destructive(),
            apply_calls: AtomicUsize::new(0),
            cache_key: None,
            dependencies: Vec::new(),
            output: "done".to_string(),
        };
        registry.register(Arc::new(destructive));

        assert_eq!(registry.tools_by_category("file_operations").len(), 1);
        let destructive: Vec<String> = registry
            .destructive_tools()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(destructive, vec!["nuke"]);

        let stats = registry.stats();
        assert_eq!(stats.total_tools, 2);
        assert_eq!(stats.tools_by_category.get("testing"), Some(&1));
    }
}
