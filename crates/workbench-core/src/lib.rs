//! Core library for Workbench
//!
//! Workbench exposes local developer operations (file access, git, code
//! structure analysis) as named, self-describing tools. This crate contains
//! the pieces every tool shares:
//!
//! - [`tools::base`]: the [`Tool`] contract and tool metadata
//! - [`tools::registry`]: name resolution, context filtering, and the
//!   execute pipeline
//! - [`tools::cache`]: the content-hash-addressed result cache
//! - [`config`]: configuration loading
//!
//! Concrete tool implementations live in the `workbench-tools` crate; the
//! `workbench-cli` crate wires everything together.

pub mod config;
pub mod error;
pub mod tools;

pub use config::{CacheSettings, WorkbenchConfig};
pub use error::{WorkbenchError, WorkbenchResult};
pub use tools::base::{FileSystemTool, PerformanceCost, Tool, ToolError, ToolMetadata};
pub use tools::cache::{CacheManager, CacheStats};
pub use tools::params::ToolParams;
pub use tools::registry::{RegistryStats, ToolRegistry};
