//! File and project structure summaries

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use workbench_core::{
    FileSystemTool, PerformanceCost, Tool, ToolError, ToolMetadata, ToolParams,
};

use super::{collect_source_files, RustSyntax};

fn summarize_source(content: &str, syntax: &RustSyntax) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut imports = Vec::new();
    let mut functions = Vec::new();
    let mut types = Vec::new();

    for line in content.lines() {
        if let Some(caps) = syntax.imports.captures(line) {
            imports.push(caps[1].trim().to_string());
        } else if let Some(caps) = syntax.functions.captures(line) {
            functions.push(caps[1].to_string());
        } else if let Some(caps) = syntax.types.captures(line) {
            types.push(format!("{} {}", &caps[1], &caps[2]));
        }
    }
    (imports, functions, types)
}

/// Tool summarizing the declarations in a single source file
pub struct AnalyzeFileStructureTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
    syntax: RustSyntax,
}

impl AnalyzeFileStructureTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "analyze_file_structure",
                "Summarize a source file: imports, functions, and type definitions",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "refactoring"])
            .with_filesystem(),
            syntax: RustSyntax::new(),
        }
    }
}

impl FileSystemTool for AnalyzeFileStructureTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for AnalyzeFileStructureTool {
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
        let content = fs::read_to_string(&file_path).await.map_err(|e| {
            ToolError::execution(self.name(), format!("cannot read {}: {}", file_path, e))
        })?;

        let (imports, functions, types) = summarize_source(&content, &self.syntax);
        let mut out = vec![format!(
            "{}: {} lines",
            file_path,
            content.lines().count()
        )];

        if !imports.is_empty() {
            out.push(format!("\nImports ({}):", imports.len()));
            out.extend(imports.iter().map(|i| format!("  use {i}")));
        }
        if !types.is_empty() {
            out.push(format!("\nTypes ({}):", types.len()));
            out.extend(types.iter().map(|t| format!("  {t}")));
        }
        if !functions.is_empty() {
            out.push(format!("\nFunctions ({}):", functions.len()));
            out.extend(functions.iter().map(|f| format!("  fn {f}")));
        }
        if imports.is_empty() && types.is_empty() && functions.is_empty() {
            out.push("\nNo declarations found".to_string());
        }
        Ok(out.join("\n"))
    }

    fn cache_key(&self, params: &ToolParams) -> Option<String> {
        let file_path = params.get_string("file_path")?;
        Some(format!("analyze_file_structure:{file_path}"))
    }

    fn file_dependencies(&self, params: &ToolParams) -> Option<Vec<PathBuf>> {
        params
            .get_string("file_path")
            .map(|p| vec![PathBuf::from(p)])
    }
}

/// Tool summarizing every source file in the project
pub struct ProjectOverviewTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
    syntax: RustSyntax,
}

impl ProjectOverviewTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "project_overview",
                "Walk the whole project and summarize every source file",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration"])
            .with_filesystem()
            .with_cost(PerformanceCost::High),
            syntax: RustSyntax::new(),
        }
    }
}

impl FileSystemTool for ProjectOverviewTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for ProjectOverviewTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, _params: &ToolParams) -> Result<String, ToolError> {
        let files = collect_source_files(&self.project_root);
        if files.is_empty() {
            return Ok(format!(
                "No Rust source files found under {}",
                self.project_root.display()
            ));
        }

        let mut out = vec![format!("Project overview: {} source file(s)\n", files.len())];
        for file in &files {
            let content = match fs::read_to_string(file).await {
                Ok(c) => c,
                Err(_) => continue,
            };
            let (_, functions, types) = summarize_source(&content, &self.syntax);
            let rel = file
                .strip_prefix(&self.project_root)
                .unwrap_or(file)
                .display();
            out.push(format!(
                "{rel}: {} lines, {} type(s), {} function(s)",
                content.lines().count(),
                types.len(),
                functions.len()
            ));
        }
        Ok(out.join("\n"))
    }

    fn cache_key(&self, _params: &ToolParams) -> Option<String> {
        Some(format!(
            "project_overview:{}",
            self.project_root.display()
        ))
    }

    // Every source file is a dependency, so any edit anywhere in the tree
    // produces a different composite key.
    fn file_dependencies(&self, _params: &ToolParams) -> Option<Vec<PathBuf>> {
        Some(collect_source_files(&self.project_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "use std::fmt;\n\npub struct Widget;\n\npub fn render(w: &Widget) -> String {\n    format!(\"{w:?}\")\n}\n\nfn helper() {}\n";

    #[tokio::test]
    async fn file_structure_lists_declarations() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("lib.rs"), SAMPLE)
            .await
            .unwrap();

        let tool = AnalyzeFileStructureTool::new(dir.path());
        let params = tool
            .validate(&ToolParams::new().with("file_path", "lib.rs"))
            .unwrap();
        let out = tool.apply(&params).await.unwrap();

        assert!(out.contains("Imports (1):"));
        assert!(out.contains("use std::fmt"));
        assert!(out.contains("struct Widget"));
        assert!(out.contains("Functions (2):"));
        assert!(out.contains("fn render"));
        assert!(out.contains("fn helper"));
    }

    #[tokio::test]
    async fn file_structure_handles_empty_files() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("empty.rs"), "")
            .await
            .unwrap();

        let tool = AnalyzeFileStructureTool::new(dir.path());
        let params = tool
            .validate(&ToolParams::new().with("file_path", "empty.rs"))
            .unwrap();
        let out = tool.apply(&params).await.unwrap();
        assert!(out.contains("No declarations found"));
    }

    #[tokio::test]
    async fn overview_covers_all_source_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        tokio::fs::write(dir.path().join("src/lib.rs"), SAMPLE)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("src/util.rs"), "fn a() {}\nfn b() {}\n")
            .await
            .unwrap();

        let tool = ProjectOverviewTool::new(dir.path());
        let out = tool.apply(&ToolParams::new()).await.unwrap();

        assert!(out.contains("2 source file(s)"));
        assert!(out.contains("src/lib.rs"));
        assert!(out.contains("src/util.rs: 2 lines, 0 type(s), 2 function(s)"));
    }

    #[tokio::test]
    async fn overview_depends_on_every_source_file() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("a.rs"), "").await.unwrap();
        tokio::fs::write(dir.path().join("b.rs"), "").await.unwrap();

        let tool = ProjectOverviewTool::new(dir.path());
        let deps = tool.file_dependencies(&ToolParams::new()).unwrap();
        assert_eq!(deps.len(), 2);
    }
}
