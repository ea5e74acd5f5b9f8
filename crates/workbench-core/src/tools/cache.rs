//! Content-hash-addressed result cache
//!
//! Cached tool results are keyed by a composite of the tool's base key and
//! the content hashes of every file the result depends on. Because the
//! composite key embeds current hashes, any change to a dependency changes
//! the computed key and the lookup transparently misses; there is no separate
//! validation pass on read.
//!
//! Entries are persisted one blob per key under a configured directory, with
//! an LRU sweep keeping the total size under a limit. Cache failures are
//! never allowed to fail the surrounding operation: every I/O error degrades
//! to a miss or a no-op and is logged at `warn`.

use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Hash sentinel for dependency paths that do not exist. Distinct from any
/// real digest (those are 64 hex chars) and from the mtime fallback.
const MISSING_FILE_HASH: &str = "absent";

/// File extension distinguishing cache blobs from anything else in the
/// cache directory
const CACHE_EXT: &str = "cache";

/// In-memory bookkeeping: last recorded hash per dependency path, and which
/// composite keys recorded each path as a dependency.
#[derive(Debug, Default)]
struct DependencyIndex {
    file_hashes: HashMap<PathBuf, String>,
    dependents: HashMap<PathBuf, HashSet<String>>,
    /// Last access per composite key, for the eviction sweep
    last_access: HashMap<String, SystemTime>,
}

/// Cache statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage with one decimal, `"0%"` before any request
    pub hit_rate: String,
    pub invalidations: u64,
    pub size_mb: f64,
    pub entry_count: usize,
    pub max_size_mb: u64,
}

impl CacheStats {
    /// One-line summary for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{} hit rate, {} entries, {:.1} MB / {} MB, {} invalidations",
            self.hit_rate, self.entry_count, self.size_mb, self.max_size_mb, self.invalidations
        )
    }
}

/// Persistent, size-bounded, content-hash-validated memoization store
pub struct CacheManager {
    dir: PathBuf,
    max_size_bytes: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    index: Mutex<DependencyIndex>,
}

impl CacheManager {
    /// Create a cache manager storing blobs under `dir` with the given size
    /// limit. The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>, max_size_mb: u64) -> Self {
        Self::with_max_bytes(dir, max_size_mb * 1024 * 1024)
    }

    fn with_max_bytes(dir: impl Into<PathBuf>, max_size_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_size_bytes,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            index: Mutex::new(DependencyIndex::default()),
        }
    }

    /// Directory holding the cache blobs
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up a cached value.
    ///
    /// Dependency hashes are recomputed and folded into the key, so a changed
    /// dependency file simply misses.
    pub async fn get(&self, base_key: &str, dependencies: Option<&[PathBuf]>) -> Option<String> {
        let (key, _) = self.composite_key(base_key, dependencies).await;
        let path = self.entry_path(&key);

        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.index.lock().last_access.insert(key, SystemTime::now());
                debug!(base_key, "cache hit");
                Some(value)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(base_key, error = %e, "cache read failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value under the composite of `base_key` and the dependencies'
    /// current content hashes, then run the eviction sweep.
    pub async fn set(&self, base_key: &str, value: &str, dependencies: Option<&[PathBuf]>) {
        let (key, dep_hashes) = self.composite_key(base_key, dependencies).await;

        if let Err(e) = self.write_entry(&key, value).await {
            warn!(base_key, error = %e, "cache write failed, skipping");
            return;
        }

        {
            let mut index = self.index.lock();
            for (path, hash) in dep_hashes {
                index
                    .dependents
                    .entry(path.clone())
                    .or_default()
                    .insert(key.clone());
                index.file_hashes.insert(path, hash);
            }
            index.last_access.insert(key, SystemTime::now());
        }

        debug!(base_key, "cached result");
        self.evict_if_needed().await;
    }

    /// Explicitly invalidate entries that recorded `path` as a dependency.
    ///
    /// Compares the path's current content hash against the last recorded
    /// one; only a real change deletes anything. Returns the number of
    /// entries removed. This exists for callers that just mutated a file
    /// (e.g. a write tool) independent of the key-embedding mechanism.
    pub async fn invalidate_file(&self, path: &Path) -> usize {
        let current = file_hash(path).await;

        let stale_keys: Vec<String> = {
            let mut index = self.index.lock();
            match index.file_hashes.get(path) {
                Some(old) if *old != current => {
                    let keys = index.dependents.remove(path).unwrap_or_default();
                    index.file_hashes.insert(path.to_path_buf(), current);
                    for key in &keys {
                        index.last_access.remove(key);
                    }
                    keys.into_iter().collect()
                }
                _ => return 0,
            }
        };

        let mut removed = 0;
        for key in stale_keys {
            match tokio::fs::remove_file(self.entry_path(&key)).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "cache invalidation failed"),
            }
        }

        if removed > 0 {
            self.invalidations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(path = %path.display(), removed, "invalidated cache entries");
        }
        removed
    }

    /// Delete every stored entry and reset the dependency index.
    ///
    /// Hit/miss/invalidation counters are process-lifetime and survive this.
    pub async fn clear(&self) -> usize {
        let mut cleared = 0;
        for path in self.entry_files().await {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => cleared += 1,
                Err(e) => warn!(error = %e, "cache clear failed for {}", path.display()),
            }
        }
        let mut index = self.index.lock();
        index.file_hashes.clear();
        index.dependents.clear();
        index.last_access.clear();
        cleared
    }

    /// Current statistics, including on-disk size and entry count
    pub async fn stats(&self) -> CacheStats {
        let mut size_bytes = 0u64;
        let mut entry_count = 0usize;
        for path in self.entry_files().await {
            if let Ok(meta) = tokio::fs::metadata(&path).await {
                size_bytes += meta.len();
                entry_count += 1;
            }
        }

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", hits as f64 / total as f64 * 100.0)
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            invalidations: self.invalidations.load(Ordering::Relaxed),
            size_mb: size_bytes as f64 / 1024.0 / 1024.0,
            entry_count,
            max_size_mb: self.max_size_bytes / 1024 / 1024,
        }
    }

    /// Build the composite key: sha256 over the base key and each
    /// `path:hash` pair. Dependencies are sorted by path first so logically
    /// identical dependency sets always produce the same key regardless of
    /// the caller-supplied order.
    async fn composite_key(
        &self,
        base_key: &str,
        dependencies: Option<&[PathBuf]>,
    ) -> (String, Vec<(PathBuf, String)>) {
        let mut dep_hashes = Vec::new();
        if let Some(deps) = dependencies {
            let mut sorted: Vec<&PathBuf> = deps.iter().collect();
            sorted.sort();
            sorted.dedup();
            for path in sorted {
                let hash = file_hash(path).await;
                dep_hashes.push((path.clone(), hash));
            }
        }

        let mut parts = vec![base_key.to_string()];
        for (path, hash) in &dep_hashes {
            parts.push(format!("{}:{}", path.display(), hash));
        }
        (hex_digest(parts.join("|").as_bytes()), dep_hashes)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{CACHE_EXT}"))
    }

    /// Write a blob atomically: temp file in the same directory, then rename,
    /// so concurrent readers never observe a torn entry.
    async fn write_entry(&self, key: &str, value: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self
            .dir
            .join(format!("{key}.{CACHE_EXT}.tmp{}", std::process::id()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, self.entry_path(key)).await
    }

    /// All cache blob paths currently on disk
    async fn entry_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(_) => return files,
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXT) {
                files.push(path);
            }
        }
        files
    }

    /// LRU sweep: when total stored bytes exceed the limit, delete entries
    /// least-recently-accessed first until back under it.
    async fn evict_if_needed(&self) {
        let mut entries: Vec<(PathBuf, u64, SystemTime)> = Vec::new();
        let mut total: u64 = 0;

        for path in self.entry_files().await {
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                continue;
            };
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let accessed = {
                let index = self.index.lock();
                index.last_access.get(&key).copied()
            };
            // Entries from a previous process are not in the access map;
            // fall back to the file's own timestamps.
            let accessed = accessed
                .or_else(|| meta.accessed().ok())
                .or_else(|| meta.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            total += meta.len();
            entries.push((path, meta.len(), accessed));
        }

        if total <= self.max_size_bytes {
            return;
        }

        entries.sort_by_key(|(_, _, accessed)| *accessed);

        let mut removed_keys = Vec::new();
        for (path, size, _) in entries {
            if total <= self.max_size_bytes {
                break;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    total = total.saturating_sub(size);
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        removed_keys.push(stem.to_string());
                    }
                }
                Err(e) => warn!(error = %e, "cache eviction failed for {}", path.display()),
            }
        }

        if !removed_keys.is_empty() {
            let mut index = self.index.lock();
            for key in &removed_keys {
                index.last_access.remove(key);
            }
            for keys in index.dependents.values_mut() {
                for key in &removed_keys {
                    keys.remove(key);
                }
            }
            index.dependents.retain(|_, keys| !keys.is_empty());
            debug!(
                removed = removed_keys.len(),
                new_size = total,
                "evicted cache entries"
            );
        }
    }
}

/// Content hash of a file: sha256 of its bytes, the `"absent"` sentinel when
/// the path does not exist, or an mtime-derived fallback when it exists but
/// cannot be read as a regular file (e.g. a directory dependency).
async fn file_hash(path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => hex_digest(&bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => MISSING_FILE_HASH.to_string(),
        Err(_) => mtime_hash(path)
            .await
            .unwrap_or_else(|| MISSING_FILE_HASH.to_string()),
    }
}

async fn mtime_hash(path: &Path) -> Option<String> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    let mtime = meta.modified().ok()?;
    let since = mtime.duration_since(SystemTime::UNIX_EPOCH).ok()?;
    Some(format!("mtime:{}", since.as_nanos()))
}

fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> CacheManager {
        CacheManager::new(dir.path().join("cache"), 100)
    }

    #[tokio::test]
    async fn miss_then_set_then_hit() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        assert_eq!(cache.get("key", None).await, None);
        cache.set("key", "value", None).await;
        assert_eq!(cache.get("key", None).await.as_deref(), Some("value"));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn dependency_content_change_misses() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let dep = dir.path().join("input.txt");
        tokio::fs::write(&dep, "v1").await.unwrap();
        let deps = vec![dep.clone()];

        cache.set("analyze", "result-v1", Some(&deps)).await;
        assert_eq!(
            cache.get("analyze", Some(&deps)).await.as_deref(),
            Some("result-v1")
        );

        tokio::fs::write(&dep, "v2").await.unwrap();
        assert_eq!(cache.get("analyze", Some(&deps)).await, None);
    }

    #[tokio::test]
    async fn missing_dependency_uses_sentinel() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let dep = dir.path().join("ghost.txt");
        let deps = vec![dep.clone()];

        cache.set("key", "no file yet", Some(&deps)).await;
        assert_eq!(
            cache.get("key", Some(&deps)).await.as_deref(),
            Some("no file yet")
        );

        // Creating the file changes its hash away from the sentinel.
        tokio::fs::write(&dep, "now it exists").await.unwrap();
        assert_eq!(cache.get("key", Some(&deps)).await, None);
    }

    #[tokio::test]
    async fn dependency_order_does_not_matter() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        tokio::fs::write(&a, "a").await.unwrap();
        tokio::fs::write(&b, "b").await.unwrap();

        cache.set("key", "value", Some(&[a.clone(), b.clone()])).await;
        assert_eq!(
            cache.get("key", Some(&[b, a])).await.as_deref(),
            Some("value")
        );
    }

    #[tokio::test]
    async fn invalidate_file_counts_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let dep = dir.path().join("source.rs");
        tokio::fs::write(&dep, "fn main() {}").await.unwrap();
        let deps = vec![dep.clone()];

        cache.set("structure", "one fn", Some(&deps)).await;

        // No change yet: nothing to invalidate.
        assert_eq!(cache.invalidate_file(&dep).await, 0);

        tokio::fs::write(&dep, "fn main() {} fn extra() {}")
            .await
            .unwrap();
        assert_eq!(cache.invalidate_file(&dep).await, 1);
        assert_eq!(cache.invalidate_file(&dep).await, 0);

        let stats = cache.stats().await;
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.entry_count, 0);
    }

    #[tokio::test]
    async fn clear_removes_entries_but_keeps_counters() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.get("a", None).await; // miss
        cache.set("a", "1", None).await;
        cache.set("b", "2", None).await;
        cache.get("a", None).await; // hit

        assert_eq!(cache.clear().await, 2);

        let stats = cache.stats().await;
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn eviction_drops_least_recently_accessed() {
        let dir = TempDir::new().unwrap();
        // Room for roughly two of the three ~40-byte entries.
        let cache = CacheManager::with_max_bytes(dir.path().join("cache"), 100);

        let payload = "x".repeat(40);
        cache.set("first", &payload, None).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        cache.set("second", &payload, None).await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        // Touch "first" so "second" becomes the eviction candidate.
        assert!(cache.get("first", None).await.is_some());
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        cache.set("third", &payload, None).await;

        assert!(cache.get("first", None).await.is_some());
        assert!(cache.get("second", None).await.is_none());
        assert!(cache.get("third", None).await.is_some());
    }

    #[tokio::test]
    async fn stats_hit_rate_formatting() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        assert_eq!(cache.stats().await.hit_rate, "0%");

        cache.set("k", "v", None).await;
        cache.get("k", None).await;
        cache.get("other", None).await;

        assert_eq!(cache.stats().await.hit_rate, "50.0%");
    }

    #[tokio::test]
    async fn unreadable_cache_dir_degrades_to_miss() {
        // Point the cache at a path that cannot be a directory.
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        tokio::fs::write(&file, "occupied").await.unwrap();
        let cache = CacheManager::new(file.join("cache"), 100);

        assert_eq!(cache.get("k", None).await, None);
        cache.set("k", "v", None).await; // logged, not fatal
        assert_eq!(cache.get("k", None).await, None);
        assert_eq!(cache.stats().await.entry_count, 0);
    }
}
