//! File mutation tools: write, append, patch
//!
//! All three are destructive and share two safety behaviors: protected
//! project files are refused, and a handle to the cache (when provided) is
//! used in the post-execute hook to invalidate entries for the mutated path.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use workbench_core::{CacheManager, FileSystemTool, Tool, ToolError, ToolMetadata, ToolParams};

/// File names that must never be overwritten by a tool
pub const PROTECTED_FILES: [&str; 5] = ["Cargo.toml", "Cargo.lock", ".gitignore", ".git", "target"];

fn is_protected(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| PROTECTED_FILES.contains(&name))
        .unwrap_or(false)
}

fn require_path(tool: &dyn Tool, params: &ToolParams) -> Result<String, ToolError> {
    params
        .get_string("file_path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ToolError::validation(tool.name(), "file_path parameter is required"))
}

async fn invalidate(cache: &Option<Arc<CacheManager>>, path: &str) {
    if let Some(cache) = cache {
        let removed = cache.invalidate_file(Path::new(path)).await;
        if removed > 0 {
            tracing::debug!(path, removed, "invalidated cache entries after write");
        }
    }
}

/// Tool for overwriting a file's contents
pub struct WriteFileTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
    cache: Option<Arc<CacheManager>>,
}

impl WriteFileTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "write_file",
                "Write content to a file, replacing what was there (use with caution)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring"])
            .with_filesystem()
            .destructive(),
            cache: None,
        }
    }

    /// Attach a cache handle for post-write invalidation
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl FileSystemTool for WriteFileTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let file_path = require_path(self, params)?;
        let content = params.get_string("content").ok_or_else(|| {
            ToolError::validation(self.name(), "content parameter is required")
        })?;
        let resolved = self.resolve_path(&file_path);
        if is_protected(&resolved) {
            return Err(ToolError::validation(
                self.name(),
                format!("{} is protected and cannot be overwritten", resolved.display()),
            ));
        }
        Ok(ToolParams::new()
            .with("file_path", resolved.to_string_lossy().into_owned())
            .with("content", content))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        let content = params.get_string("content").unwrap_or_default();
        let path = Path::new(&file_path);

        // Keep a backup of whatever is being replaced.
        if path.is_file() {
            let backup = format!("{file_path}.backup");
            fs::copy(path, &backup).await.map_err(|e| {
                ToolError::execution(self.name(), format!("cannot back up {}: {}", file_path, e))
            })?;
        }

        fs::write(path, &content).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot write {}: {}", file_path, e))
        })?;
        Ok(format!("Successfully wrote to {file_path}"))
    }

    async fn post_execute(&self, _result: &str, params: &ToolParams) {
        if let Some(path) = params.get_string("file_path") {
            invalidate(&self.cache, &path).await;
        }
    }
}

/// Tool for appending content to a file
pub struct AppendFileTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
    cache: Option<Arc<CacheManager>>,
}

impl AppendFileTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "append_file",
                "Append content to the end of a file",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring"])
            .with_filesystem()
            .destructive(),
            cache: None,
        }
    }

    /// Attach a cache handle for post-write invalidation
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl FileSystemTool for AppendFileTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for AppendFileTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let file_path = require_path(self, params)?;
        let content = params.get_string("content").ok_or_else(|| {
            ToolError::validation(self.name(), "content parameter is required")
        })?;
        let resolved = self.resolve_path(&file_path);
        if is_protected(&resolved) {
            return Err(ToolError::validation(
                self.name(),
                format!("{} is protected and cannot be modified", resolved.display()),
            ));
        }
        Ok(ToolParams::new()
            .with("file_path", resolved.to_string_lossy().into_owned())
            .with("content", content))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        let content = params.get_string("content").unwrap_or_default();

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(|e| {
                ToolError::execution(self.name(), format!("cannot open {}: {}", file_path, e))
            })?;
        file.write_all(content.as_bytes()).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot append to {}: {}", file_path, e))
        })?;
        Ok(format!("Appended {} bytes to {file_path}", content.len()))
    }

    async fn post_execute(&self, _result: &str, params: &ToolParams) {
        if let Some(path) = params.get_string("file_path") {
            invalidate(&self.cache, &path).await;
        }
    }
}

/// Tool for replacing specific text in a file, safer than rewriting it
pub struct PatchFileTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
    cache: Option<Arc<CacheManager>>,
}

impl PatchFileTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "patch_file",
                "Replace specific text in a file (find and replace)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring", "debugging"])
            .with_filesystem()
            .destructive(),
            cache: None,
        }
    }

    /// Attach a cache handle for post-write invalidation
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl FileSystemTool for PatchFileTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for PatchFileTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let file_path = require_path(self, params)?;
        let old_text = params
            .get_string("old_text")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ToolError::validation(self.name(), "old_text parameter is required")
            })?;
        let new_text = params.get_string("new_text").ok_or_else(|| {
            ToolError::validation(self.name(), "new_text parameter is required")
        })?;
        let resolved = self.resolve_path(&file_path);
        if is_protected(&resolved) {
            return Err(ToolError::validation(
                self.name(),
                format!("{} is protected and cannot be modified", resolved.display()),
            ));
        }
        Ok(ToolParams::new()
            .with("file_path", resolved.to_string_lossy().into_owned())
            .with("old_text", old_text)
            .with("new_text", new_text))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        let old_text = params.get_string("old_text").unwrap_or_default();
        let new_text = params.get_string("new_text").unwrap_or_default();

        let content = fs::read_to_string(&file_path).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot read {}: {}", file_path, e))
        })?;

        let occurrences = content.matches(&old_text).count();
        if occurrences == 0 {
            return Err(ToolError::execution(
                self.name(),
                format!("old_text not found in {file_path}"),
            ));
        }

        let patched = content.replace(&old_text, &new_text);
        fs::write(&file_path, patched).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot write {}: {}", file_path, e))
        })?;
        Ok(format!(
            "Replaced {occurrences} occurrence(s) in {file_path}"
        ))
    }

    async fn post_execute(&self, _result: &str, params: &ToolParams) {
        if let Some(path) = params.get_string("file_path") {
            invalidate(&self.cache, &path).await;
        }
    }
}
