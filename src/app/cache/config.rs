//! Cache configuration types and defaults

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::cache;
use crate::errors::{CacheError, CacheResult, ConfigError};

/// Which response cache backend a fetcher uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// No caching; every fetch is a plain GET
    Off,
    /// Process-local [`MemoryCache`](super::MemoryCache)
    #[default]
    Memory,
    /// On-disk [`FsCache`](super::FsCache)
    #[serde(alias = "disk")]
    Filesystem,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheMode::Off => "off",
            CacheMode::Memory => "memory",
            CacheMode::Filesystem => "filesystem",
        };
        f.write_str(name)
    }
}

impl FromStr for CacheMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(CacheMode::Memory),
            "filesystem" | "fs" | "disk" => Ok(CacheMode::Filesystem),
            "off" | "none" | "disabled" | "" => Ok(CacheMode::Off),
            _ => Err(ConfigError::UnknownCacheMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the response cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection
    pub mode: CacheMode,
    /// Root directory for the filesystem backend (OS-specific if None)
    pub cache_root: Option<PathBuf>,
    /// Entry lifetime; zero disables expiry
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::default(),
            cache_root: None,
            ttl: cache::DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Configuration for a given backend with default TTL
    pub fn with_mode(mode: CacheMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set the cache root directory
    pub fn with_cache_root(mut self, cache_root: PathBuf) -> Self {
        self.cache_root = Some(cache_root);
        self
    }

    /// Set the entry lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Configured root, or the OS default
    pub fn resolved_root(&self) -> CacheResult<PathBuf> {
        match &self.cache_root {
            Some(path) => Ok(path.clone()),
            None => default_cache_dir(),
        }
    }
}

/// Default cache directory for the current OS
///
/// - macOS: ~/Library/Caches/nflverse_fetcher
/// - Linux: ~/.cache/nflverse_fetcher
/// - Windows: %LOCALAPPDATA%/nflverse_fetcher
pub fn default_cache_dir() -> CacheResult<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| CacheError::DirectoryNotAccessible {
            path: PathBuf::from("system cache directory"),
        })?
        .join(cache::DIR_NAME);

    Ok(cache_dir)
}
