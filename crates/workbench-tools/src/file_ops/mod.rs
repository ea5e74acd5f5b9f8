//! File operation tools

mod list;
mod read;
mod search;
mod write;

pub use list::{FindFilesTool, ListDirectoryTool};
pub use read::{ReadFileTool, ReadLinesTool};
pub use search::FindInFileTool;
pub use write::{AppendFileTool, PatchFileTool, WriteFileTool, PROTECTED_FILES};

/// Category label shared by every file tool
pub const CATEGORY: &str = "file_operations";
