//! File reading tools

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use workbench_core::{FileSystemTool, Tool, ToolError, ToolMetadata, ToolParams};

/// Tool for reading a file's full contents
pub struct ReadFileTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl ReadFileTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "read_file",
                "Read the contents of a file",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "debugging", "refactoring"])
            .with_filesystem(),
        }
    }
}

impl FileSystemTool for ReadFileTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let file_path = params
            .get_string("file_path")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ToolError::validation(self.name(), "file_path parameter is required")
            })?;
        let resolved = self.resolve_path(&file_path);
        Ok(ToolParams::new().with("file_path", resolved.to_string_lossy().into_owned()))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        fs::read_to_string(&file_path).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot read {}: {}", file_path, e))
        })
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let file_path = params.get_string("file_path")?;
        Some(format!("read_file:{file_path}"))
    }

    fn file_dependencies(&self, params: &ToolParams) -> Option<Vec<PathBuf>> {
        params
            .get_string("file_path")
            .map(|p| vec![PathBuf::from(p)])
    }
}

/// Tool for reading a 1-indexed line range from a file
pub struct ReadLinesTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl ReadLinesTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "read_lines",
                "Read specific line ranges from a file (1-indexed)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "debugging"])
            .with_filesystem(),
        }
    }
}

impl FileSystemTool for ReadLinesTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for ReadLinesTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let file_path = params
            .get_string("file_path")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ToolError::validation(self.name(), "file_path parameter is required")
            })?;
        let resolved = self.resolve_path(&file_path);

        let mut validated =
            ToolParams::new().with("file_path", resolved.to_string_lossy().into_owned());
        let start = params.get_usize("start_line");
        if let Some(start) = start {
            if start == 0 {
                return Err(ToolError::validation(
                    self.name(),
                    "start_line is 1-indexed and must be >= 1",
                ));
            }
            validated.insert("start_line", start as u64);
        }
        if let Some(end) = params.get_usize("end_line") {
            if end < start.unwrap_or(1) {
                return Err(ToolError::validation(
                    self.name(),
                    format!("end_line {} is before start_line {}", end, start.unwrap_or(1)),
                ));
            }
            validated.insert("end_line", end as u64);
        }
        Ok(validated)
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        let content = fs::read_to_string(&file_path).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot read {}: {}", file_path, e))
        })?;

        let lines: Vec<&str> = content.lines().collect();
        let start = params.get_usize("start_line").unwrap_or(1);
        let end = params.get_usize("end_line").unwrap_or(lines.len());

        if start > lines.len() {
            return Ok(format!(
                "File has only {} lines, nothing at line {}",
                lines.len(),
                start
            ));
        }

        // Reversed ranges are rejected in validate; clamping keeps a raw
        // caller's reversed range to an empty selection instead of a panic.
        let end = end.min(lines.len()).max(start - 1);
        let selected: Vec<String> = lines[start - 1..end]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>5} | {}", start + i, line))
            .collect();
        Ok(selected.join("\n"))
    }
}
