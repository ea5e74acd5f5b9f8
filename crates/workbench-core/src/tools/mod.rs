//! Tool system: contract, parameters, registry, and result cache

pub mod base;
pub mod cache;
pub mod params;
pub mod registry;

pub use base::{FileSystemTool, PerformanceCost, Tool, ToolError, ToolMetadata};
pub use cache::{CacheManager, CacheStats};
pub use params::ToolParams;
pub use registry::{RegistryStats, ToolRegistry};
