//! End-to-end tests running real tools through the registry

use std::sync::Arc;
use tempfile::TempDir;
use workbench_core::{CacheManager, CacheStats, ToolParams, ToolRegistry};
use workbench_tools::default_tools;

async fn setup() -> (TempDir, ToolRegistry, Arc<CacheManager>) {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(CacheManager::new(dir.path().join(".workbench-cache"), 100));
    let mut registry = ToolRegistry::new(cache.clone());
    registry.register_all(default_tools(dir.path(), cache.clone()));
    (dir, registry, cache)
}

async fn stats(cache: &CacheManager) -> CacheStats {
    cache.stats().await
}

#[tokio::test]
async fn read_file_round_trip_with_cache_hit() {
    let (dir, registry, cache) = setup().await;
    tokio::fs::write(dir.path().join("notes.txt"), "hello")
        .await
        .unwrap();

    let params = ToolParams::new().with("file_path", "notes.txt");

    let first = registry
        .execute("read_file", Some("exploration"), &params)
        .await
        .unwrap();
    assert_eq!(first, "hello");
    assert_eq!(stats(&cache).await.misses, 1);
    assert_eq!(stats(&cache).await.hits, 0);

    let second = registry
        .execute("read_file", Some("exploration"), &params)
        .await
        .unwrap();
    assert_eq!(second, "hello");
    assert_eq!(stats(&cache).await.hits, 1);
}

#[tokio::test]
async fn write_then_read_sees_fresh_content() {
    let (dir, registry, _cache) = setup().await;
    tokio::fs::write(dir.path().join("data.txt"), "v1")
        .await
        .unwrap();

    let read = ToolParams::new().with("file_path", "data.txt");
    assert_eq!(registry.execute("read_file", None, &read).await.unwrap(), "v1");

    let write = ToolParams::new()
        .with("file_path", "data.txt")
        .with("content", "v2");
    let out = registry.execute("write_file", None, &write).await.unwrap();
    assert!(out.contains("Successfully wrote"));

    // Changed content must not serve the stale cached result.
    assert_eq!(registry.execute("read_file", None, &read).await.unwrap(), "v2");
}

#[tokio::test]
async fn git_push_to_main_is_blocked_through_registry() {
    let (_dir, registry, cache) = setup().await;

    let out = registry
        .execute("git_push", None, &ToolParams::new().with("branch", "main"))
        .await
        .unwrap();
    assert!(out.contains("blocked"));

    // The guard fires before git and without any cache involvement.
    let s = stats(&cache).await;
    assert_eq!(s.hits + s.misses, 0);
}

#[tokio::test]
async fn default_tool_set_registers_everything() {
    let (_dir, registry, _cache) = setup().await;

    assert_eq!(registry.stats().total_tools, 20);
    for name in [
        "read_file",
        "read_lines",
        "list_directory",
        "find_files",
        "find_in_file",
        "write_file",
        "append_file",
        "patch_file",
        "git_status",
        "git_branch",
        "git_log",
        "git_diff",
        "git_add",
        "git_commit",
        "git_push",
        "git_checkout",
        "analyze_file_structure",
        "project_overview",
        "find_function_usages",
        "function_signature",
    ] {
        assert!(registry.has_tool(name), "missing tool: {name}");
    }
}

#[tokio::test]
async fn context_filtering_over_real_tools() {
    let (_dir, registry, _cache) = setup().await;

    let exploration: Vec<String> = registry
        .list(Some("exploration"))
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert!(exploration.contains(&"read_file".to_string()));
    assert!(exploration.contains(&"git_status".to_string()));
    // Mutating tools are not advertised for exploration.
    assert!(!exploration.contains(&"write_file".to_string()));
    assert!(!exploration.contains(&"git_push".to_string()));

    // Every tool carries the general context.
    assert_eq!(registry.list(Some("general")).len(), 20);
}

#[tokio::test]
async fn destructive_tools_are_flagged() {
    let (_dir, registry, _cache) = setup().await;

    let destructive: Vec<String> = registry
        .destructive_tools()
        .into_iter()
        .map(|m| m.name)
        .collect();
    for name in [
        "write_file",
        "append_file",
        "patch_file",
        "git_add",
        "git_commit",
        "git_push",
        "git_checkout",
    ] {
        assert!(destructive.contains(&name.to_string()), "not flagged: {name}");
    }
    assert!(!destructive.contains(&"read_file".to_string()));
}

#[tokio::test]
async fn analysis_results_invalidate_on_edit() {
    let (dir, registry, cache) = setup().await;
    let src = dir.path().join("mod.rs");
    tokio::fs::write(&src, "fn one() {}\n").await.unwrap();

    let params = ToolParams::new().with("file_path", "mod.rs");
    let first = registry
        .execute("analyze_file_structure", None, &params)
        .await
        .unwrap();
    assert!(first.contains("fn one"));

    tokio::fs::write(&src, "fn one() {}\nfn two() {}\n")
        .await
        .unwrap();
    let second = registry
        .execute("analyze_file_structure", None, &params)
        .await
        .unwrap();
    assert!(second.contains("fn two"));
    assert_eq!(stats(&cache).await.misses, 2);
}

#[tokio::test]
async fn cache_clear_keeps_counters() {
    let (dir, registry, cache) = setup().await;
    tokio::fs::write(dir.path().join("f.txt"), "x").await.unwrap();

    let params = ToolParams::new().with("file_path", "f.txt");
    registry.execute("read_file", None, &params).await.unwrap();
    registry.execute("read_file", None, &params).await.unwrap();

    cache.clear().await;
    let s = stats(&cache).await;
    assert_eq!(s.entry_count, 0);
    assert_eq!(s.hits, 1);
    assert_eq!(s.misses, 1);
}
