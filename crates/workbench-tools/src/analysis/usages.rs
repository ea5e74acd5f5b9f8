//! Function lookup across the project

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use workbench_core::{
    FileSystemTool, PerformanceCost, Tool, ToolError, ToolMetadata, ToolParams,
};

use super::collect_source_files;

fn require_function_name(tool: &dyn Tool, params: &ToolParams) -> Result<String, ToolError> {
    let name = params
        .get_string("function_name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            ToolError::validation(tool.name(), "function_name parameter is required")
        })?;
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ToolError::validation(
            tool.name(),
            format!("'{name}' is not a valid function name"),
        ));
    }
    Ok(name)
}

/// Tool listing every call site of a function across the project
pub struct FindFunctionUsagesTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl FindFunctionUsagesTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "find_function_usages",
                "Find every place a function is called across the project",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring", "debugging"])
            .with_filesystem()
            .with_cost(PerformanceCost::High),
        }
    }
}

impl FileSystemTool for FindFunctionUsagesTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for FindFunctionUsagesTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let name = require_function_name(self, params)?;
        Ok(ToolParams::new().with("function_name", name))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let name = params.get_string("function_name").unwrap_or_default();
        let call = Regex::new(&format!(r"\b{}\s*\(", regex::escape(&name))).map_err(|e| {
            ToolError::execution(self.name(), format!("cannot build search pattern: {e}"))
        })?;
        let definition = Regex::new(&format!(r"\bfn\s+{}\s*[(<]", regex::escape(&name)))
            .map_err(|e| {
                ToolError::execution(self.name(), format!("cannot build search pattern: {e}"))
            })?;

        let mut usages = Vec::new();
        for file in collect_source_files(&self.project_root) {
            let content = match fs::read_to_string(&file).await {
                Ok(c) => c,
                Err(_) => continue,
            };
            let rel = file
                .strip_prefix(&self.project_root)
                .unwrap_or(&file)
                .display()
                .to_string();
            for (i, line) in content.lines().enumerate() {
                if call.is_match(line) && !definition.is_match(line) {
                    usages.push(format!("{rel}:{}: {}", i + 1, line.trim()));
                }
            }
        }

        if usages.is_empty() {
            return Ok(format!("No usages of '{name}' found"));
        }
        Ok(format!(
            "Found {} usage(s) of '{}':\n{}",
            usages.len(),
            name,
            usages.join("\n")
        ))
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let name = params.get_string("function_name")?;
        Some(format!(
            "find_function_usages:{}:{}",
            self.project_root.display(),
            name
        ))
    }

    fn file_dependencies(&self, _params: &ToolParams) -> Option<Vec<PathBuf>> {
        Some(collect_source_files(&self.project_root))
    }
}

/// Tool locating a function's definition and signature
pub struct FunctionSignatureTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl FunctionSignatureTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "function_signature",
                "Find a function's definition and show its signature with doc comments",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "refactoring"])
            .with_filesystem()
            .with_cost(PerformanceCost::Medium),
        }
    }

    fn extract(name: &str, rel: &str, lines: &[&str], def_idx: usize) -> String {
        // Walk back over any doc comment block directly above the signature.
        let mut doc_start = def_idx;
        while doc_start > 0 {
            let prev = lines[doc_start - 1].trim_start();
            if prev.starts_with("///") || prev.starts_with("#[") {
                doc_start -= 1;
            } else {
                break;
            }
        }

        // The signature may span lines until the opening brace or semicolon.
        let mut sig_end = def_idx;
        while sig_end < lines.len() {
            let line = lines[sig_end];
            if line.contains('{') || line.trim_end().ends_with(';') {
                break;
            }
            sig_end += 1;
        }
        let sig_end = sig_end.min(lines.len() - 1);

        let mut out = vec![format!("'{name}' defined at {rel}:{}", def_idx + 1)];
        for line in &lines[doc_start..=sig_end] {
            out.push(line.to_string());
        }
        out.join("\n")
    }
}

impl FileSystemTool for FunctionSignatureTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for FunctionSignatureTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let name = require_function_name(self, params)?;
        Ok(ToolParams::new().with("function_name", name))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let name = params.get_string("function_name").unwrap_or_default();
        let definition = Regex::new(&format!(r"\bfn\s+{}\s*[(<]", regex::escape(&name)))
            .map_err(|e| {
                ToolError::execution(self.name(), format!("cannot build search pattern: {e}"))
            })?;

        for file in collect_source_files(&self.project_root) {
            let content = match fs::read_to_string(&file).await {
                Ok(c) => c,
                Err(_) => continue,
            };
            let lines: Vec<&str> = content.lines().collect();
            if let Some(idx) = lines.iter().position(|l| definition.is_match(l)) {
                let rel = file
                    .strip_prefix(&self.project_root)
                    .unwrap_or(&file)
                    .display()
                    .to_string();
                return Ok(Self::extract(&name, &rel, &lines, idx));
            }
        }
        Ok(format!("Function '{name}' not found in project"))
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let name = params.get_string("function_name")?;
        Some(format!(
            "function_signature:{}:{}",
            self.project_root.display(),
            name
        ))
    }

    fn file_dependencies(&self, _params: &ToolParams) -> Option<Vec<PathBuf>> {
        Some(collect_source_files(&self.project_root))
    }
}
