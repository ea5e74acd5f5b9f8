//! Shared git subprocess plumbing

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a git subcommand in `repo` and return its output as a string.
///
/// Never returns an error: failures become descriptive strings so tools can
/// surface them directly. A directory that is not a git repository is
/// detected up front with `git rev-parse`.
pub(crate) async fn run_git(repo: &Path, args: &[&str]) -> String {
    if !is_git_repo(repo).await {
        return format!("Not a git repository: {}", repo.display());
    }
    run_raw(repo, args).await
}

async fn is_git_repo(repo: &Path) -> bool {
    let probe = Command::new("git")
        .arg("rev-parse")
        .arg("--git-dir")
        .current_dir(repo)
        .output();
    match tokio::time::timeout(GIT_TIMEOUT, probe).await {
        Ok(Ok(out)) => out.status.success(),
        _ => false,
    }
}

async fn run_raw(repo: &Path, args: &[&str]) -> String {
    let command = Command::new("git").args(args).current_dir(repo).output();
    match tokio::time::timeout(GIT_TIMEOUT, command).await {
        Ok(Ok(out)) => {
            if out.status.success() {
                String::from_utf8_lossy(&out.stdout).trim_end().to_string()
            } else {
                let stderr = String::from_utf8_lossy(&out.stderr);
                format!("Git error: {}", stderr.trim())
            }
        }
        Ok(Err(e)) => format!("Error running git command: {e}"),
        Err(_) => format!("Git command timed out after {}s", GIT_TIMEOUT.as_secs()),
    }
}

/// Name of the currently checked-out branch, or None outside a repo.
pub(crate) async fn current_branch(repo: &Path) -> Option<String> {
    let out = run_git(repo, &["branch", "--show-current"]).await;
    if out.starts_with("Git error:")
        || out.starts_with("Not a git repository")
        || out.starts_with("Error running")
        || out.is_empty()
    {
        None
    } else {
        Some(out)
    }
}
