//! Tool implementations for Workbench
//!
//! Every tool here implements the `workbench-core` [`Tool`] contract and is
//! a thin wrapper over file-system, git, or source-scanning primitives. The
//! interesting coordination (validation, caching, context filtering) happens
//! in the core registry, not in these modules.

pub mod analysis;
pub mod file_ops;
pub mod vcs;

pub use analysis::{
    AnalyzeFileStructureTool, FindFunctionUsagesTool, FunctionSignatureTool, ProjectOverviewTool,
};
pub use file_ops::{
    AppendFileTool, FindFilesTool, FindInFileTool, ListDirectoryTool, PatchFileTool,
    ReadFileTool, ReadLinesTool, WriteFileTool,
};
pub use vcs::{
    GitAddTool, GitBranchTool, GitCheckoutTool, GitCommitTool, GitDiffTool, GitLogTool,
    GitPushTool, GitStatusTool,
};

use std::path::Path;
use std::sync::Arc;
use workbench_core::{CacheManager, Tool};

/// Build the full default tool set for a project.
///
/// Destructive file tools get a handle to the cache so they can explicitly
/// invalidate entries for the paths they mutate.
pub fn default_tools(project_root: &Path, cache: Arc<CacheManager>) -> Vec<Arc<dyn Tool>> {
    vec![
        // File operations
        Arc::new(ReadFileTool::new(project_root)),
        Arc::new(ReadLinesTool::new(project_root)),
        Arc::new(ListDirectoryTool::new(project_root)),
        Arc::new(FindFilesTool::new(project_root)),
        Arc::new(FindInFileTool::new(project_root)),
        Arc::new(WriteFileTool::new(project_root).with_cache(cache.clone())),
        Arc::new(AppendFileTool::new(project_root).with_cache(cache.clone())),
        Arc::new(PatchFileTool::new(project_root).with_cache(cache)),
        // Git operations
        Arc::new(GitStatusTool::new(project_root)),
        Arc::new(GitBranchTool::new(project_root)),
        Arc::new(GitLogTool::new(project_root)),
        Arc::new(GitDiffTool::new(project_root)),
        Arc::new(GitAddTool::new(project_root)),
        Arc::new(GitCommitTool::new(project_root)),
        Arc::new(GitPushTool::new(project_root)),
        Arc::new(GitCheckoutTool::new(project_root)),
        // Code analysis
        Arc::new(AnalyzeFileStructureTool::new(project_root)),
        Arc::new(ProjectOverviewTool::new(project_root)),
        Arc::new(FindFunctionUsagesTool::new(project_root)),
        Arc::new(FunctionSignatureTool::new(project_root)),
    ]
}
