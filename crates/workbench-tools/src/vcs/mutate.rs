//! State-changing git tools: add, commit, checkout, push

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use workbench_core::{FileSystemTool, Tool, ToolError, ToolMetadata, ToolParams};

use super::{current_branch, run_git};

const MIN_COMMIT_MESSAGE_LEN: usize = 5;

/// Branches a push is never allowed to target directly.
const PUSH_BLOCKED_BRANCHES: [&str; 2] = ["main", "master"];

/// Tool staging files for commit
pub struct GitAddTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitAddTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_add",
                "Stage files for commit (defaults to all changes)",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring"])
            .with_git()
            .destructive(),
        }
    }
}

impl FileSystemTool for GitAddTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitAddTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let target = params
            .get_string("path")
            .unwrap_or_else(|| ".".to_string());
        let out = run_git(&self.project_root, &["add", &target]).await;
        if out.is_empty() {
            return Ok(format!("Staged changes in {target}"));
        }
        Ok(out)
    }
}

/// Tool creating a commit from staged changes
pub struct GitCommitTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitCommitTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_commit",
                "Commit staged changes with a message",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring"])
            .with_git()
            .destructive(),
        }
    }
}

impl FileSystemTool for GitCommitTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitCommitTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let message = params
            .get_string("message")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                ToolError::validation(self.name(), "message parameter is required")
            })?;
        if message.len() < MIN_COMMIT_MESSAGE_LEN {
            return Err(ToolError::validation(
                self.name(),
                format!("commit message must be at least {MIN_COMMIT_MESSAGE_LEN} characters"),
            ));
        }
        Ok(ToolParams::new().with("message", message))
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let message = params.get_string("message").unwrap_or_default();
        Ok(run_git(&self.project_root, &["commit", "-m", &message]).await)
    }
}

/// Tool switching branches, optionally creating the target
pub struct GitCheckoutTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitCheckoutTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_checkout",
                "Switch to a branch, creating it first with create_new=true",
                super::CATEGORY,
            )
            .with_contexts(&["general", "refactoring"])
            .with_git()
            .destructive(),
        }
    }
}

impl FileSystemTool for GitCheckoutTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitCheckoutTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    fn validate(&self, params: &ToolParams) -> Result<ToolParams, ToolError> {
        let branch = params
            .get_string("branch")
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ToolError::validation(self.name(), "branch parameter is required"))?;
        let mut validated = ToolParams::new().with("branch", branch);
        if let Some(create) = params.get_bool("create_new") {
            validated.insert("create_new", create);
        }
        Ok(validated)
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let branch = params.get_string("branch").unwrap_or_default();
        let create = params.get_bool("create_new").unwrap_or(false);
        let out = if create {
            run_git(&self.project_root, &["checkout", "-b", &branch]).await
        } else {
            run_git(&self.project_root, &["checkout", &branch]).await
        };
        if out.is_empty() {
            return Ok(format!("Switched to branch '{branch}'"));
        }
        Ok(out)
    }
}

/// Tool pushing the current branch to its remote.
///
/// Pushes targeting main or master are refused before any git command runs.
pub struct GitPushTool {
    project_root: PathBuf,
    metadata: ToolMetadata,
}

impl GitPushTool {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            metadata: ToolMetadata::new(
                "git_push",
                "Push a branch to its remote (pushes to main/master are blocked)",
                super::CATEGORY,
            )
            .with_contexts(&["general"])
            .with_git()
            .destructive(),
        }
    }
}

impl FileSystemTool for GitPushTool {
    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

#[async_trait]
impl Tool for GitPushTool {
    fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    async fn apply(&self, params: &ToolParams) -> Result<String, ToolError> {
        let branch = match params.get_string("branch") {
            Some(b) if !b.is_empty() => b,
            _ => match current_branch(&self.project_root).await {
                Some(b) => b,
                None => return Ok("Cannot determine current branch to push".to_string()),
            },
        };

        if PUSH_BLOCKED_BRANCHES
            .iter()
            .any(|blocked| branch.eq_ignore_ascii_case(blocked))
        {
            return Ok(format!(
                "Push to '{branch}' blocked: direct pushes to protected branches are not allowed"
            ));
        }

        let remote = params
            .get_string("remote")
            .unwrap_or_else(|| "origin".to_string());
        let out = run_git(&self.project_root, &["push", &remote, &branch]).await;
        if out.is_empty() {
            return Ok(format!("Pushed {branch} to {remote}"));
        }
        Ok(out)
    }
}
