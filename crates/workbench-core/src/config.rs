//! Configuration for the Workbench server
//!
//! Configuration is loaded from an optional TOML file and falls back to
//! sensible defaults. There is no ambient global config: the loaded value is
//! passed explicitly to whatever constructs the registry and cache.

use crate::error::{WorkbenchError, WorkbenchResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "workbench.toml";

/// Cache-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Directory holding cache entry blobs
    pub dir: PathBuf,
    /// Maximum total size of stored entries before eviction kicks in
    pub max_size_mb: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("workbench")
            .join("cache");
        Self {
            dir,
            max_size_mb: 100,
        }
    }
}

/// Top-level Workbench configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Project root used to resolve relative paths in tool parameters
    pub project_root: PathBuf,
    /// Cache settings
    pub cache: CacheSettings,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            cache: CacheSettings::default(),
        }
    }
}

impl WorkbenchConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist and parse. Without one,
    /// `workbench.toml` in the current directory is used when present,
    /// otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> WorkbenchResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> WorkbenchResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            WorkbenchError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }
}
