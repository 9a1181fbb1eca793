//! Cache statistics and disk usage monitoring
//!
//! Scans a filesystem cache directory for stored bodies and sidecars.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::constants::cache::{DATA_EXTENSION, META_EXTENSION, TEMP_FILE_SUFFIX};

/// Filesystem cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Cache root directory
    pub cache_root: PathBuf,
    /// Number of cached response bodies
    pub entries: usize,
    /// Number of sidecars whose TTL has elapsed
    pub expired_entries: usize,
    /// Total size of cached bodies in bytes
    pub total_bytes: u64,
}

impl CacheStats {
    /// Create empty statistics for a cache root
    pub fn new(cache_root: PathBuf) -> Self {
        Self {
            cache_root,
            entries: 0,
            expired_entries: 0,
            total_bytes: 0,
        }
    }

    /// Number of entries still fresh
    pub fn fresh_entries(&self) -> usize {
        self.entries.saturating_sub(self.expired_entries)
    }

    /// Format cache size in human-readable format
    pub fn format_size(&self) -> String {
        format_bytes(self.total_bytes)
    }
}

/// Directory scanner for cache statistics
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Count cached bodies and their total size without blocking the runtime
    pub async fn scan_cache_directory(cache_root: &Path) -> (usize, u64) {
        let cache_root = cache_root.to_path_buf();

        tokio::task::spawn_blocking(move || Self::scan_directory_sync(&cache_root))
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to scan cache directory: {}", e);
                (0, 0)
            })
    }

    /// Count cached bodies and their total size
    pub fn scan_directory_sync(dir: &Path) -> (usize, u64) {
        let mut file_count = 0;
        let mut total_size = 0u64;

        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && Self::is_data_file(&path) {
                    file_count += 1;
                    if let Ok(metadata) = entry.metadata() {
                        total_size += metadata.len();
                    }
                }
            }
        }

        (file_count, total_size)
    }

    /// Check if a file holds a cached body
    pub fn is_data_file(path: &Path) -> bool {
        has_extension(path, DATA_EXTENSION)
    }

    /// Check if a file is a sidecar
    pub fn is_meta_file(path: &Path) -> bool {
        has_extension(path, META_EXTENSION)
    }

    /// Check if a file is an unfinished atomic write
    pub fn is_temp_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(TEMP_FILE_SUFFIX))
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension().is_some_and(|extension| extension == expected)
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: u64 = 1024;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD as f64 && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD as f64;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
