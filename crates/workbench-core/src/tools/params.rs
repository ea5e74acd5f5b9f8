//! Tool parameter map
//!
//! Tools receive keyword arguments as JSON values keyed by name. The map is
//! what `validate` normalizes and what `cache_key` / `file_dependencies` are
//! derived from, so it needs cheap cloning and typed accessors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keyword arguments for a tool invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolParams {
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ToolParams {
    /// Create an empty parameter map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing map
    pub fn from_map(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Insert a parameter value
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.insert(key, value);
        self
    }

    /// Get a raw JSON value
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Get a typed parameter value
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_as::<String>(key)
    }

    /// Get a boolean parameter
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_as::<bool>(key)
    }

    /// Get an unsigned integer parameter
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_as::<u64>(key).map(|n| n as usize)
    }

    /// Whether a parameter is present
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
