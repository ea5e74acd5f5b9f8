//! In-file text search

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use workbench_core::{FileSystemTool, Tool, ToolError, ToolMetadata, ToolParams};

const DEFAULT_CONTEXT_LINES: usize = 3;

/// Tool for finding a substring in a file with surrounding context lines
pub struct FindInFileTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl FindInFileTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "find_in_file",
                "Search for text in a file and show matching lines with context",
                super::CATEGORY,
            )
            .with_contexts(&["general", "debugging", "refactoring"])
            .with_filesystem(),
        }
    }
}

impl FileSystemTool for FindInFileTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for FindInFileTool {
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
        let pattern = params
            .get_string("pattern")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ToolError::validation(self.name(), "pattern parameter is required"))?;
        let resolved = self.resolve_path(&file_path);

        let mut validated = ToolParams::new()
            .with("file_path", resolved.to_string_lossy().into_owned())
            .with("pattern", pattern);
        if let Some(context) = params.get_usize("context_lines") {
            validated.insert("context_lines", context as u64);
        }
        Ok(validated)
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let file_path = params.get_string("file_path").unwrap_or_default();
        let pattern = params.get_string("pattern").unwrap_or_default();
        let context = params
            .get_usize("context_lines")
            .unwrap_or(DEFAULT_CONTEXT_LINES);

        let content = fs::read_to_string(&file_path).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot read {}: {}", file_path, e))
        })?;

        let lines: Vec<&str> = content.lines().collect();
        let matches: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(&pattern))
            .map(|(i, _)| i)
            .collect();

        if matches.is_empty() {
            return Ok(format!("No matches for '{pattern}' in {file_path}"));
        }

        let mut blocks = Vec::new();
        for &idx in &matches {
            let start = idx.saturating_sub(context);
            let end = idx
                .saturating_add(context)
                .saturating_add(1)
                .min(lines.len());
            let block: Vec<String> = (start..end)
                .map(|i| {
                    let marker = if i == idx { ">" } else { " " };
                    format!("{marker}{:>5} | {}", i + 1, lines[i])
                })
                .collect();
            blocks.push(block.join("\n"));
        }

        Ok(format!(
            "Found {} match(es) for '{}' in {}:\n\n{}",
            matches.len(),
            pattern,
            file_path,
            blocks.join("\n---\n")
        ))
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let file_path = params.get_string("file_path")?;
        let pattern = params.get_string("pattern")?;
        let context = params
            .get_usize("context_lines")
            .unwrap_or(DEFAULT_CONTEXT_LINES);
        Some(format!("find_in_file:{file_path}:{pattern}:{context}"))
    }

    fn file_dependencies(&self, params: &ToolParams) -> Option<Vec<PathBuf>> {
        params
            .get_string("file_path")
            .map(|p| vec![PathBuf::from(p)])
    }
}
