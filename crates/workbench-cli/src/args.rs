//! Command line argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "workbench")]
#[command(about = "Local developer-assistant tool server with content-aware caching")]
#[command(version)]
pub struct Cli {
    /// Path to a workbench.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root, overriding the configured one
    #[arg(long, global = true)]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tools
    List(ListArgs),
    /// Run a tool by name
    Run(RunArgs),
    /// Inspect or clear the result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show tools available in this context mode
    #[arg(long)]
    pub context: Option<String>,

    /// Only show tools in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only show destructive tools
    #[arg(long)]
    pub destructive: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the tool to run
    pub tool: String,

    /// Context mode to run under
    #[arg(long)]
    pub context: Option<String>,

    /// Tool parameters as key=value pairs (values parsed as JSON, falling
    /// back to plain strings)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Stats,
    /// Remove all cached entries (counters are kept)
    Clear,
}

/// Split a `key=value` argument, parsing the value as JSON when possible.
pub fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' is not a KEY=VALUE pair"))?;
    if key.is_empty() {
        return Err(format!("'{raw}' has an empty key"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
