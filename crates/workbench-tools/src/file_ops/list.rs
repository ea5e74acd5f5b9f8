//! Directory listing and glob search tools

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use workbench_core::{
    FileSystemTool, PerformanceCost, Tool, ToolError, ToolMetadata, ToolParams,
};

/// Tool for listing directory contents with file sizes
pub struct ListDirectoryTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl ListDirectoryTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "list_directory",
                "List contents of a directory with file sizes",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration"])
            .with_filesystem(),
        }
    }
}

impl FileSystemTool for ListDirectoryTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let directory = params
            .get_string("directory_path")
            .unwrap_or_else(|| ".".to_string());
        let resolved = self.resolve_path(&directory);
        Ok(ToolParams::new().with("directory_path", resolved.to_string_lossy().into_owned()))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let directory = params.get_string("directory_path").unwrap_or_default();
        let mut entries = fs::read_dir(&directory).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot list {}: {}", directory, e))
        })?;

        let mut items = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata().await {
                Ok(meta) if meta.is_dir() => items.push(format!("dir: {name}")),
                Ok(meta) => items.push(format!("file: {name} ({} bytes)", meta.len())),
                Err(_) => items.push(format!("file: {name}")),
            }
        }
        items.sort();
        Ok(items.join("\n"))
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let directory = params.get_string("directory_path")?;
        Some(format!("list_directory:{directory}"))
    }

    fn file_dependencies(&self, params: &ToolParams) -> Option<Vec<PathBuf>> {
        // Directories hash to their mtime, which changes when entries are
        // added or removed.
        params
            .get_string("directory_path")
            .map(|p| vec![PathBuf::from(p)])
    }
}

/// Tool for finding files by glob pattern
pub struct FindFilesTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl FindFilesTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "find_files",
                "Find files matching a glob pattern (e.g. '*.rs', '**/*.toml')",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "debugging"])
            .with_filesystem()
            .with_cost(PerformanceCost::Medium),
        }
    }
}

impl FileSystemTool for FindFilesTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for FindFilesTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let pattern = params
            .get_string("pattern")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ToolError::validation(self.name(), "pattern parameter is required"))?;
        let directory = params
            .get_string("directory")
            .unwrap_or_else(|| ".".to_string());
        let resolved = self.resolve_path(&directory);
        Ok(ToolParams::new()
            .with("pattern", pattern)
            .with("directory", resolved.to_string_lossy().into_owned()))
    }

    // Results shift under directory changes the dependency list cannot
    // capture, so this tool declines caching.
    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let pattern = params.get_string("pattern").unwrap_or_default();
        let directory = params.get_string("directory").unwrap_or_default();
        let search = Path::new(&directory).join(&pattern);

        let paths = glob::glob(&search.to_string_lossy()).map_err(|e| {
            ToolError::validation(self.name(), format!("invalid pattern '{}': {}", pattern, e))
        })?;

        let mut results = Vec::new();
        for path in paths.flatten() {
            if path.is_file() {
                let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                results.push(format!("{} ({} bytes)", path.display(), size));
            } else {
                results.push(format!("{} (directory)", path.display()));
            }
        }
        results.sort();

        if results.is_empty() {
            return Ok(format!(
                "No files found matching pattern '{pattern}' in {directory}"
            ));
        }
        Ok(format!(
            "Found {} matches:\n{}",
            results.len(),
            results.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn list_directory_shows_kinds_and_sizes() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("a.txt"), "12345")
            .await
            .unwrap();
        tokio::fs::create_dir(dir.path().join("sub")).await.unwrap();

        let tool = ListDirectoryTool::new(dir.path());
        let params = tool.validate(&ToolParams::new()).unwrap();
        let out = tool.apply(&params).await.unwrap();

        assert!(out.contains("file: a.txt (5 bytes)"));
        assert!(out.contains("dir: sub"));
    }

    #[tokio::test]
    async fn list_directory_defaults_to_project_root() {
        let tool = ListDirectoryTool::new("/repo");
        let params = tool.validate(&ToolParams::new()).unwrap();
        assert_eq!(
            params.get_string("directory_path").as_deref(),
            Some("/repo/.")
        );
    }

    #[tokio::test]
    async fn find_files_matches_pattern() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("lib.rs"), "").await.unwrap();
        tokio::fs::write(dir.path().join("note.md"), "").await.unwrap();

        let tool = FindFilesTool::new(dir.path());
        let params = tool
            .validate(&ToolParams::new().with("pattern", "*.rs"))
            .unwrap();
        let out = tool.apply(&params).await.unwrap();

        assert!(out.contains("Found 1 matches"));
        assert!(out.contains("lib.rs"));
        assert!(!out.contains("note.md"));
    }

    #[tokio::test]
    async fn find_files_reports_empty_results() {
        let dir = TempDir::new().unwrap();
        let tool = FindFilesTool::new(dir.path());
        let params = tool
            .validate(&ToolParams::new().with("pattern", "*.nope"))
            .unwrap();
        let out = tool.apply(&params).await.unwrap();
        assert!(out.contains("No files found"));
    }

    #[tokio::test]
    async fn find_files_requires_pattern() {
        let tool = FindFilesTool::new("/repo");
        assert!(tool.validate(&ToolParams::new()).is_err());
    }

    #[tokio::test]
    async fn find_files_declines_caching() {
        let tool = FindFilesTool::new("/repo");
        let params = ToolParams::new().with("pattern", "*.rs").with("directory", "/repo");
        assert!(tool.cache_key(&params).is_none());
    }
}
