//! Read-only git tools: status, branch, log, diff

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use workbench_core::{FileSystemTool, Tool, ToolError, ToolMetadata, ToolParams};

use super::{current_branch, run_git};

const DEFAULT_LOG_LIMIT: usize = 10;

fn status_label(code: &str) -> &'static str {
    match code {
        "??" => "untracked",
        "A " | "AM" => "added",
        "M " | "MM" | " M" => "modified",
        "D " | " D" => "deleted",
        "R " | "RM" => "renamed",
        "C " => "copied",
        "UU" => "conflicted",
        _ => "changed",
    }
}

fn render_status(porcelain: &str) -> String {
    let mut lines = porcelain.lines();
    let mut out = Vec::new();

    if let Some(header) = lines.next() {
        if let Some(branch) = header.strip_prefix("## ") {
            out.push(format!("On branch {branch}"));
        }
    }

    let mut changes = Vec::new();
    for line in lines {
        if line.len() < 3 {
            continue;
        }
        let (code, path) = line.split_at(2);
        changes.push(format!("  {}: {}", status_label(code), path.trim()));
    }

    if changes.is_empty() {
        out.push("Working tree clean".to_string());
    } else {
        out.push(format!("{} change(s):", changes.len()));
        out.extend(changes);
    }
    out.join("\n")
}

/// Tool showing working tree status in a readable form
pub struct GitStatusTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitStatusTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_status",
                "Show the working tree status (branch, staged and unstaged changes)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "debugging"])
            .with_git(),
        }
    }
}

impl FileSystemTool for GitStatusTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitStatusTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, _params: &ToolParams) -> Result<String, ToolError> {
        let out = run_git(&self.project_root, &["status", "--porcelain", "-b"]).await;
        if out.starts_with("Not a git repository")
            || out.starts_with("Git error:")
            || out.starts_with("Error running")
        {
            return Ok(out);
        }
        Ok(render_status(&out))
    }
}

fn render_branches(current: Option<&str>, listing: &str) -> String {
    match current {
        Some(branch) => format!("Current branch: {branch}\n{listing}"),
        None => listing.to_string(),
    }
}

/// Tool listing all branches (local and remote-tracking) with the current
/// one called out
pub struct GitBranchTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitBranchTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_branch",
                "Show the current branch and list local and remote branches",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration"])
            .with_git(),
        }
    }
}

impl FileSystemTool for GitBranchTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitBranchTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, _params: &ToolParams) -> Result<String, ToolError> {
        let current = current_branch(&self.project_root).await;
        let listing = run_git(&self.project_root, &["branch", "-a"]).await;
        Ok(render_branches(current.as_deref(), &listing))
    }
}

/// Tool showing recent commit history
pub struct GitLogTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitLogTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_log",
                "Show recent commit history (oneline, with branch graph)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "exploration", "debugging"])
            .with_git(),
        }
    }
}

impl FileSystemTool for GitLogTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitLogTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let limit = params.get_usize("limit").unwrap_or(DEFAULT_LOG_LIMIT);
        let count = format!("-{limit}");
        Ok(run_git(
            &self.project_root,
            &["log", "--oneline", "--graph", "--decorate", &count],
        )
        .await)
    }
}

/// Tool showing the current diff
pub struct GitDiffTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitDiffTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_diff",
                "Show unstaged changes, or staged changes with staged=true",
                super::CATEGORY,
            )
            .with_contexts(&["general", "debugging", "refactoring"])
            .with_git(),
        }
    }
}

impl FileSystemTool for GitDiffTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitDiffTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let staged = params.get_bool("staged").unwrap_or(false);
        let args: &[&str] = if staged {
            &["diff", "--staged"]
        } else {
            &["diff"]
        };
        let out = run_git(&self.project_root, args).await;
        if out.is_empty() {
            return Ok("No changes".to_string());
        }
        Ok(out)
    }
}
