//! Source analysis tools
//!
//! Analysis here is regex-driven line scanning over Rust sources. It trades
//! precision for zero build requirements: results are good enough for
//! orientation (what is in this file, where is this function used) without
//! parsing the code.

mod structure;
mod syntax;
mod usages;

pub use structure::{AnalyzeFileStructureTool, ProjectOverviewTool};
pub use usages::{FindFunctionUsagesTool, FunctionSignatureTool};

pub(crate) use syntax::{collect_source_files, RustSyntax};

/// Category label shared by every analysis tool
pub const CATEGORY: &str = "code_analysis";
