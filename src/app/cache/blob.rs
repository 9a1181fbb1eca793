//! General-purpose blob cache
//!
//! A key/bytes store independent of the fetch pipeline, with a memory tier, a
//! disk tier, or both. Memory entries expire by insertion time; disk entries
//! expire by file modification time. Disk files are named by the SHA-1 of the
//! key, so the disk tier cannot enumerate keys.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use sha1::{Digest, Sha1};
use tokio::fs;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::constants::cache::{BLOB_EXTENSION, BLOB_MAX_MEMORY_ENTRIES};
use crate::errors::{CacheError, CacheResult};

/// Storage tiers used by a [`BlobCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobMode {
    /// Store nothing
    Off,
    /// Memory tier only
    Memory,
    /// Disk tier only
    Disk,
    /// Both tiers; disk hits hydrate memory
    Both,
}

impl BlobMode {
    fn uses_memory(self) -> bool {
        matches!(self, BlobMode::Memory | BlobMode::Both)
    }

    fn uses_disk(self) -> bool {
        matches!(self, BlobMode::Disk | BlobMode::Both)
    }
}

/// Options for constructing a [`BlobCache`]
#[derive(Debug, Clone)]
pub struct BlobOptions {
    /// Storage tiers
    pub mode: BlobMode,
    /// Disk tier directory (required for `Disk` and `Both`)
    pub dir: Option<PathBuf>,
    /// Entry lifetime; zero disables expiry
    pub ttl: Duration,
    /// Memory entry cap; zero means unbounded
    pub max_memory_entries: usize,
}

impl Default for BlobOptions {
    fn default() -> Self {
        Self {
            mode: BlobMode::Memory,
            dir: None,
            ttl: Duration::ZERO,
            max_memory_entries: BLOB_MAX_MEMORY_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct BlobEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

impl BlobEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Keyed byte cache with memory and disk tiers
#[derive(Debug)]
pub struct BlobCache {
    mode: BlobMode,
    dir: Option<PathBuf>,
    ttl: Duration,
    max_memory_entries: usize,
    memory: RwLock<HashMap<String, BlobEntry>>,
}

impl BlobCache {
    /// Create a blob cache, creating the disk directory when the mode needs it
    ///
    /// # Errors
    ///
    /// Returns `CacheError::DirectoryNotAccessible` when a disk tier is
    /// requested without a usable directory
    pub async fn new(options: BlobOptions) -> CacheResult<Self> {
        if options.mode.uses_disk() {
            let dir = options
                .dir
                .as_ref()
                .ok_or_else(|| CacheError::DirectoryNotAccessible {
                    path: PathBuf::from("<unset blob cache directory>"),
                })?;
            fs::create_dir_all(dir)
                .await
                .map_err(|_| CacheError::DirectoryNotAccessible { path: dir.clone() })?;
        }

        Ok(Self {
            mode: options.mode,
            dir: options.dir,
            ttl: options.ttl,
            max_memory_entries: options.max_memory_entries,
            memory: RwLock::new(HashMap::new()),
        })
    }

    /// Storage tiers in use
    pub fn mode(&self) -> BlobMode {
        self.mode
    }

    /// Number of entries in the memory tier, expired or not
    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.len()
    }

    /// Look up `key`, dropping expired entries on the way
    pub async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        if self.mode.uses_memory() {
            let now = Instant::now();
            let hit = self.memory.read().await.get(key).cloned();
            match hit {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.data)),
                Some(_) => {
                    self.memory.write().await.remove(key);
                    debug!("Dropped expired blob {} from memory", key);
                }
                None => {}
            }
        }

        if let Some(path) = self.disk_path(key) {
            let modified = match fs::metadata(&path).await {
                Ok(meta) => meta.modified().map_err(|e| io_error(&path, e))?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(io_error(&path, e)),
            };

            if self.disk_expired(modified, SystemTime::now()) {
                remove_if_exists(&path).await?;
                debug!("Dropped expired blob {} from disk", key);
                return Ok(None);
            }

            let data = Bytes::from(fs::read(&path).await.map_err(|e| io_error(&path, e))?);
            if self.mode == BlobMode::Both {
                self.insert_memory(key, data.clone()).await;
            }
            return Ok(Some(data));
        }

        Ok(None)
    }

    /// Store `data` under `key` in every active tier
    pub async fn set(&self, key: &str, data: impl Into<Bytes>) -> CacheResult<()> {
        let data = data.into();
        if self.mode.uses_memory() {
            self.insert_memory(key, data.clone()).await;
        }
        if let Some(path) = self.disk_path(key) {
            fs::write(&path, &data).await.map_err(|e| io_error(&path, e))?;
        }
        Ok(())
    }

    /// Remove `key` from every tier
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.mode.uses_memory() {
            self.memory.write().await.remove(key);
        }
        if let Some(path) = self.disk_path(key) {
            remove_if_exists(&path).await?;
        }
        Ok(())
    }

    /// Remove entries matching a glob `pattern`
    ///
    /// An empty pattern or `*` clears everything. Other patterns are matched
    /// against memory keys only, with `*` and `?` stopping at `/`; since disk
    /// files carry no key, any pattern containing `*` wipes the whole disk tier.
    pub async fn clear(&self, pattern: &str) -> CacheResult<()> {
        if pattern.is_empty() || pattern == "*" {
            self.memory.write().await.clear();
            self.wipe_disk().await?;
            return Ok(());
        }

        let matcher = glob::Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;

        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::new()
        };
        self.memory
            .write()
            .await
            .retain(|key, _| !matcher.matches_with(key, options));

        if pattern.contains('*') {
            self.wipe_disk().await?;
        }
        Ok(())
    }

    /// Remove expired entries from both tiers, returning how many were dropped
    pub async fn cleanup(&self) -> CacheResult<usize> {
        let mut removed = 0;

        if self.mode.uses_memory() {
            let now = Instant::now();
            let mut memory = self.memory.write().await;
            let before = memory.len();
            memory.retain(|_, entry| !entry.is_expired(now));
            removed += before - memory.len();
        }

        if self.mode.uses_disk() && !self.ttl.is_zero() {
            let now = SystemTime::now();
            for path in self.disk_files().await? {
                let modified = match fs::metadata(&path).await.and_then(|m| m.modified()) {
                    Ok(modified) => modified,
                    Err(e) => {
                        warn!("Skipping blob {}: {}", path.display(), e);
                        continue;
                    }
                };
                if self.disk_expired(modified, now) {
                    remove_if_exists(&path).await?;
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }

    async fn insert_memory(&self, key: &str, data: Bytes) {
        let expires_at = (!self.ttl.is_zero()).then(|| Instant::now() + self.ttl);
        let mut memory = self.memory.write().await;

        if self.max_memory_entries > 0
            && memory.len() >= self.max_memory_entries
            && !memory.contains_key(key)
        {
            if let Some(victim) = memory.keys().next().cloned() {
                memory.remove(&victim);
                debug!("Evicted blob {} to make room", victim);
            }
        }

        memory.insert(key.to_string(), BlobEntry { data, expires_at });
    }

    fn disk_path(&self, key: &str) -> Option<PathBuf> {
        if !self.mode.uses_disk() {
            return None;
        }
        let name = format!("{}.{}", hex::encode(Sha1::digest(key.as_bytes())), BLOB_EXTENSION);
        self.dir.as_ref().map(|dir| dir.join(name))
    }

    fn disk_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        now.duration_since(modified)
            .map(|age| age >= self.ttl)
            .unwrap_or(false)
    }

    async fn disk_files(&self) -> CacheResult<Vec<PathBuf>> {
        let Some(dir) = self.dir.as_ref().filter(|_| self.mode.uses_disk()) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(io_error(dir, e)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == BLOB_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn wipe_disk(&self) -> CacheResult<()> {
        for path in self.disk_files().await? {
            remove_if_exists(&path).await?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

async fn remove_if_exists(path: &Path) -> CacheResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn blob_cache(mode: BlobMode, ttl: Duration, dir: Option<&Path>) -> BlobCache {
        BlobCache::new(BlobOptions {
            mode,
            dir: dir.map(Path::to_path_buf),
            ttl,
            max_memory_entries: 0,
        })
        .await
        .unwrap()
    }

    fn blob_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == BLOB_EXTENSION))
            .count()
    }

    #[tokio::test]
    async fn test_memory_set_get_delete() {
        let cache = blob_cache(BlobMode::Memory, Duration::ZERO, None).await;
        cache.set("players", Bytes::from_static(b"abc")).await.unwrap();
        assert_eq!(cache.get("players").await.unwrap().unwrap(), Bytes::from_static(b"abc"));

        cache.delete("players").await.unwrap();
        assert!(cache.get("players").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_expiry() {
        let cache = blob_cache(BlobMode::Memory, Duration::from_secs(1), None).await;
        cache.set("k", Bytes::from_static(b"v")).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.memory_len().await, 0);
    }

    #[tokio::test]
    async fn test_memory_cap_evicts_one_entry() {
        let cache = BlobCache::new(BlobOptions {
            mode: BlobMode::Memory,
            dir: None,
            ttl: Duration::ZERO,
            max_memory_entries: 2,
        })
        .await
        .unwrap();

        cache.set("a", Bytes::from_static(b"1")).await.unwrap();
        cache.set("b", Bytes::from_static(b"2")).await.unwrap();
        cache.set("b", Bytes::from_static(b"22")).await.unwrap();
        assert_eq!(cache.memory_len().await, 2);

        cache.set("c", Bytes::from_static(b"3")).await.unwrap();
        assert_eq!(cache.memory_len().await, 2);
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disk_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = blob_cache(BlobMode::Disk, Duration::from_secs(60), Some(temp_dir.path())).await;

        cache.set("season:2024", b"rows".to_vec()).await.unwrap();
        assert_eq!(blob_files(temp_dir.path()), 1);
        assert_eq!(cache.memory_len().await, 0);
        assert_eq!(&cache.get("season:2024").await.unwrap().unwrap()[..], b"rows");
    }

    #[tokio::test]
    async fn test_disk_expiry_uses_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let cache = blob_cache(BlobMode::Disk, Duration::from_secs(60), Some(temp_dir.path())).await;
        cache.set("old", b"x".to_vec()).await.unwrap();

        let path = cache.disk_path("old").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(3600))
            .unwrap();

        assert!(cache.get("old").await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_both_mode_hydrates_memory() {
        let temp_dir = TempDir::new().unwrap();
        let writer = blob_cache(BlobMode::Disk, Duration::ZERO, Some(temp_dir.path())).await;
        writer.set("k", b"from disk".to_vec()).await.unwrap();

        let cache = blob_cache(BlobMode::Both, Duration::ZERO, Some(temp_dir.path())).await;
        assert_eq!(cache.memory_len().await, 0);
        assert_eq!(&cache.get("k").await.unwrap().unwrap()[..], b"from disk");
        assert_eq!(cache.memory_len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_pattern_semantics() {
        let temp_dir = TempDir::new().unwrap();
        let cache = blob_cache(BlobMode::Both, Duration::ZERO, Some(temp_dir.path())).await;
        cache.set("snaps:2023", b"a".to_vec()).await.unwrap();
        cache.set("snaps:2024", b"b".to_vec()).await.unwrap();
        cache.set("players", b"c".to_vec()).await.unwrap();

        // Exact pattern: memory only, disk untouched.
        cache.clear("players").await.unwrap();
        assert_eq!(cache.memory_len().await, 2);
        assert_eq!(blob_files(temp_dir.path()), 3);

        // Wildcard: matching memory keys plus the entire disk tier.
        cache.clear("snaps:*").await.unwrap();
        assert_eq!(cache.memory_len().await, 0);
        assert_eq!(blob_files(temp_dir.path()), 0);
    }

    #[tokio::test]
    async fn test_clear_pattern_stops_at_separator() {
        let cache = blob_cache(BlobMode::Memory, Duration::ZERO, None).await;
        cache.set("data/snap_counts/2023", b"a".to_vec()).await.unwrap();
        cache.set("data/players", b"b".to_vec()).await.unwrap();

        cache.clear("data/*").await.unwrap();
        assert_eq!(cache.memory_len().await, 1);
        assert!(cache.get("data/snap_counts/2023").await.unwrap().is_some());
        assert!(cache.get("data/players").await.unwrap().is_none());

        cache.clear("data/*/*").await.unwrap();
        assert_eq!(cache.memory_len().await, 0);
    }

    #[tokio::test]
    async fn test_clear_everything() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("other.txt"), b"keep").unwrap();
        let cache = blob_cache(BlobMode::Both, Duration::ZERO, Some(temp_dir.path())).await;
        cache.set("a", b"1".to_vec()).await.unwrap();

        cache.clear("").await.unwrap();
        assert_eq!(cache.memory_len().await, 0);
        assert_eq!(blob_files(temp_dir.path()), 0);
        assert!(temp_dir.path().join("other.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_pattern() {
        let cache = blob_cache(BlobMode::Memory, Duration::ZERO, None).await;
        match cache.clear("[").await.unwrap_err() {
            CacheError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "["),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_off_mode_stores_nothing() {
        let cache = blob_cache(BlobMode::Off, Duration::ZERO, None).await;
        cache.set("k", b"v".to_vec()).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disk_mode_requires_directory() {
        let result = BlobCache::new(BlobOptions {
            mode: BlobMode::Disk,
            ..Default::default()
        })
        .await;
        assert!(matches!(result, Err(CacheError::DirectoryNotAccessible { .. })));
    }

    #[tokio::test]
    async fn test_cleanup_counts_disk_removals() {
        let temp_dir = TempDir::new().unwrap();
        let cache = blob_cache(BlobMode::Disk, Duration::from_secs(60), Some(temp_dir.path())).await;
        cache.set("stale", b"x".to_vec()).await.unwrap();
        cache.set("fresh", b"y".to_vec()).await.unwrap();

        let stale = cache.disk_path("stale").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(600))
            .unwrap();

        assert_eq!(cache.cleanup().await.unwrap(), 1);
        assert!(cache.get("fresh").await.unwrap().is_some());
    }
}
