//! Git tools
//!
//! These tools shell out to the `git` binary and never raise for git
//! failures: a missing repo, a bad ref, or a failed command all come back as
//! a descriptive result string, so a caller can show the message as-is.

mod command;
mod mutate;
mod query;

pub use mutate::{GitAddTool, GitCheckoutTool, GitCommitTool, GitPushTool};
pub use query::{GitBranchTool, GitDiffTool, GitLogTool, GitStatusTool};

pub(crate) use command::{current_branch, run_git};

/// Category label shared by every git tool
pub const CATEGORY: &str = "git_operations";
