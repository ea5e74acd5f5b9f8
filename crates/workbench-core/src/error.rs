//! Error types for Workbench

use thiserror::Error;

/// Result type alias for Workbench operations
pub type WorkbenchResult<T> = Result<T, WorkbenchError>;

/// Top-level error type for Workbench
#[derive(Error, Debug)]
pub enum WorkbenchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool execution errors
    #[error(transparent)]
    Tool(#[from] crate::tools::base::ToolError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl WorkbenchError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<std::io::Error> for WorkbenchError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for WorkbenchError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}
