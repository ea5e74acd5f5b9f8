//! Workbench command line entry point

mod args;

use anyhow::{bail, Context, Result};
use args::{CacheCommands, Cli, Commands, ListArgs, RunArgs};
use clap::Parser;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use workbench_core::{CacheManager, ToolMetadata, ToolParams, ToolRegistry, WorkbenchConfig};
use workbench_tools::default_tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = WorkbenchConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(root) = cli.project_root {
        config.project_root = root;
    }

    let cache = Arc::new(CacheManager::new(
        config.cache.dir.clone(),
        config.cache.max_size_mb,
    ));
    let mut registry = ToolRegistry::new(cache.clone());
    registry.register_all(default_tools(&config.project_root, cache.clone()));

    match cli.command {
        Commands::List(args) => list_tools(&registry, &args),
        Commands::Run(args) => run_tool(&registry, &args).await?,
        Commands::Cache { command } => match command {
            CacheCommands::Stats => {
                println!("{}", cache.stats().await.summary());
            }
            CacheCommands::Clear => {
                let cleared = cache.clear().await;
                println!("Cleared {cleared} cache entries");
            }
        },
    }

    Ok(())
}

fn list_tools(registry: &ToolRegistry, args: &ListArgs) {
    let mut tools: Vec<ToolMetadata> = registry.list(args.context.as_deref());
    if let Some(category) = &args.category {
        tools.retain(|m| &m.category == category);
    }
    if args.destructive {
        tools.retain(|m| m.is_destructive);
    }

    if tools.is_empty() {
        println!("No tools match the given filters");
        return;
    }

    for meta in tools {
        let mut flags = Vec::new();
        if meta.is_destructive {
            flags.push("destructive");
        }
        if meta.requires_git {
            flags.push("git");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("{} ({}){}", meta.name, meta.category, flags);
        println!("    {}", meta.description);
        println!("    contexts: {}", meta.context_modes.join(", "));
    }
}

async fn run_tool(registry: &ToolRegistry, args: &RunArgs) -> Result<()> {
    let mut map = HashMap::new();
    for raw in &args.params {
        let (key, value) = args::parse_param(raw).map_err(|e| anyhow::anyhow!(e))?;
        map.insert(key, value);
    }
    let params = ToolParams::from_map(map);

    if !registry.has_tool(&args.tool) {
        bail!(
            "unknown tool '{}' (run 'workbench list' to see available tools)",
            args.tool
        );
    }

    let result = registry
        .execute(&args.tool, args.context.as_deref(), &params)
        .await
        .with_context(|| format!("tool '{}' failed", args.tool))?;
    println!("{result}");
    Ok(())
}
