//! Regex patterns and file discovery shared by the analysis tools

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SKIP_DIRS: [&str; 3] = ["target", "node_modules", ".git"];

/// Compiled patterns for picking declarations out of Rust source lines.
pub(crate) struct RustSyntax {
    pub imports: Regex,
    pub functions: Regex,
    pub types: Regex,
}

impl RustSyntax {
    pub fn new() -> Self {
        // The patterns are static and known-good, so construction cannot
        // fail at runtime.
        Self {
            imports: Regex::new(r"^\s*(?:pub\s+)?use\s+([\w:{}*,\s]+);").unwrap(),
            functions: Regex::new(
                r"^\s*(?:pub(?:\([\w\s]+\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:const\s+)?fn\s+(\w+)",
            )
            .unwrap(),
            types: Regex::new(
                r"^\s*(?:pub(?:\([\w\s]+\))?\s+)?(struct|enum|trait|type)\s+(\w+)",
            )
            .unwrap(),
        }
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|n| n.starts_with('.') && n != ".")
        .unwrap_or(false)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|n| SKIP_DIRS.contains(&n))
            .unwrap_or(false)
}

/// All Rust sources under `root`, sorted, skipping build output and hidden
/// directories.
pub(crate) fn collect_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().and_then(|x| x.to_str()) == Some("rs")
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
