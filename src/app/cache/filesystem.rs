//! On-disk response cache
//!
//! Each URL maps to two files named by the lowercase hex SHA-1 of the URL:
//! `<hash>.data` holds the body and `<hash>.json` the sidecar metadata. Both
//! are written through a temporary file and renamed into place. There is no
//! in-process locking; concurrent writers to the same URL race and the last
//! rename wins.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::constants::cache::{DATA_EXTENSION, META_EXTENSION, TEMP_FILE_SUFFIX};
use crate::errors::{CacheError, CacheResult};

use super::stats::{CacheStats, DirectoryScanner};
use super::traits::{collect_body, BodyStream, Metadata, ResponseCache, Validators};

/// Sidecar metadata persisted next to each cached body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
    pub saved_at: DateTime<Utc>,
}

impl Sidecar {
    fn metadata(&self) -> Metadata {
        Metadata {
            etag: self.etag.clone(),
            last_modified: self.last_modified,
            content_length: Some(self.size),
        }
    }

    /// Whether `ttl` has elapsed since `saved_at` (zero never expires)
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        if ttl.is_zero() {
            return false;
        }
        // A saved_at in the future counts as fresh.
        let age = (now - self.saved_at).to_std().unwrap_or(Duration::ZERO);
        age > ttl
    }
}

/// Response cache backed by a directory of files
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
    ttl: Duration,
}

impl FsCache {
    /// Open (creating if necessary) a cache rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns `CacheError::DirectoryNotAccessible` if the directory cannot be created
    pub async fn new(root: impl Into<PathBuf>, ttl: Duration) -> CacheResult<Self> {
        let root = root.into();
        ensure_directory_exists(&root).await?;
        info!("Initialized filesystem cache at {}", root.display());
        Ok(Self { root, ttl })
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Lowercase hex SHA-1 of a URL
    pub fn key_for(url: &str) -> String {
        hex::encode(Sha1::digest(url.as_bytes()))
    }

    /// Path of the cached body for `url`
    pub fn data_path(&self, url: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", Self::key_for(url), DATA_EXTENSION))
    }

    /// Path of the sidecar for `url`
    pub fn meta_path(&self, url: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", Self::key_for(url), META_EXTENSION))
    }

    /// Entry counts and disk usage
    pub async fn stats(&self) -> CacheStats {
        let (entries, total_bytes) = DirectoryScanner::scan_cache_directory(&self.root).await;

        let mut expired_entries = 0;
        let now = Utc::now();
        for path in self.list_files(DirectoryScanner::is_meta_file).await {
            match read_sidecar(&path).await {
                Ok(sidecar) if !sidecar.is_expired(self.ttl, now) => {}
                _ => expired_entries += 1,
            }
        }

        let mut stats = CacheStats::new(self.root.clone());
        stats.entries = entries;
        stats.total_bytes = total_bytes;
        stats.expired_entries = expired_entries.min(entries);
        stats
    }

    /// Sidecar for `url`, ignoring TTL
    pub async fn sidecar(&self, url: &str) -> CacheResult<Sidecar> {
        read_sidecar(&self.meta_path(url)).await
    }

    async fn fresh_sidecar(&self, url: &str) -> Option<Sidecar> {
        match self.sidecar(url).await {
            Ok(sidecar) if !sidecar.is_expired(self.ttl, Utc::now()) => Some(sidecar),
            Ok(_) => {
                debug!("Filesystem cache entry for {} has expired", url);
                None
            }
            Err(CacheError::NotFound { .. }) => None,
            Err(e) => {
                warn!("Ignoring unreadable cache sidecar for {}: {}", url, e);
                None
            }
        }
    }

    async fn persist(&self, url: &str, metadata: &Metadata, body: &[u8]) -> CacheResult<()> {
        let meta_path = self.meta_path(url);
        let sidecar = Sidecar {
            etag: metadata.etag.clone(),
            last_modified: metadata.last_modified,
            size: body.len() as u64,
            saved_at: Utc::now(),
        };
        let sidecar_json = serde_json::to_vec_pretty(&sidecar).map_err(|e| CacheError::Metadata {
            path: meta_path.clone(),
            source: e,
        })?;

        write_atomic(&self.data_path(url), body).await?;
        if let Err(e) = write_atomic(&meta_path, &sidecar_json).await {
            // A stale sidecar must not vouch for the new body.
            let _ = remove_if_exists(&meta_path).await;
            return Err(e);
        }
        Ok(())
    }

    async fn list_files(&self, filter: fn(&Path) -> bool) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read cache directory {}: {}", self.root.display(), e);
                return files;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if filter(&path) {
                files.push(path);
            }
        }
        files
    }
}

#[async_trait]
impl ResponseCache for FsCache {
    async fn validators(&self, url: &str) -> Option<Validators> {
        let sidecar = self.fresh_sidecar(url).await?;
        Some(sidecar.metadata().validators())
    }

    async fn store_stream(
        &self,
        url: &str,
        metadata: Metadata,
        body: BodyStream,
    ) -> CacheResult<Bytes> {
        let body = collect_body(url, body).await?;

        // Disk writes are best effort once the body has been read.
        if let Err(e) = self.persist(url, &metadata, &body).await {
            warn!("Failed to cache {} on disk: {}", url, e);
        } else {
            debug!("Stored {} bytes on disk for {}", body.len(), url);
        }

        Ok(Bytes::from(body))
    }

    async fn open(&self, url: &str) -> CacheResult<(Bytes, Metadata)> {
        let data_path = self.data_path(url);
        let body = fs::read(&data_path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound {
                key: url.to_string(),
            },
            _ => CacheError::Io {
                path: data_path.clone(),
                source: e,
            },
        })?;

        let metadata = match self.sidecar(url).await {
            Ok(sidecar) => sidecar.metadata(),
            Err(e) => {
                warn!("Serving {} without metadata: {}", url, e);
                Metadata {
                    content_length: Some(body.len() as u64),
                    ..Default::default()
                }
            }
        };

        Ok((Bytes::from(body), metadata))
    }

    async fn clear(&self) -> CacheResult<()> {
        let files = self
            .list_files(|path| {
                DirectoryScanner::is_data_file(path)
                    || DirectoryScanner::is_meta_file(path)
                    || DirectoryScanner::is_temp_file(path)
            })
            .await;
        for path in &files {
            remove_if_exists(path).await?;
        }
        info!("Cleared {} files from {}", files.len(), self.root.display());
        Ok(())
    }

    async fn cleanup(&self) -> CacheResult<usize> {
        let now = Utc::now();
        let mut removed = 0;

        for meta_path in self.list_files(DirectoryScanner::is_meta_file).await {
            let expired = match read_sidecar(&meta_path).await {
                Ok(sidecar) => sidecar.is_expired(self.ttl, now),
                Err(_) => true,
            };
            if expired {
                remove_if_exists(&meta_path.with_extension(DATA_EXTENSION)).await?;
                remove_if_exists(&meta_path).await?;
                removed += 1;
            }
        }

        // Bodies whose sidecar never landed cannot be validated.
        for data_path in self.list_files(DirectoryScanner::is_data_file).await {
            if !fs::try_exists(data_path.with_extension(META_EXTENSION))
                .await
                .unwrap_or(false)
            {
                remove_if_exists(&data_path).await?;
                removed += 1;
            }
        }

        // Leftovers from interrupted or failed writes. A write racing this
        // sweep loses its temporary file and is simply not cached.
        for temp_path in self.list_files(DirectoryScanner::is_temp_file).await {
            remove_if_exists(&temp_path).await?;
            debug!("Removed unfinished write {}", temp_path.display());
        }

        if removed > 0 {
            info!("Removed {} expired cache entries", removed);
        }
        Ok(removed)
    }
}

async fn ensure_directory_exists(path: &Path) -> CacheResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).await.map_err(|e| {
            warn!("Failed to create cache directory {}: {}", path.display(), e);
            CacheError::DirectoryNotAccessible {
                path: path.to_path_buf(),
            }
        })?;
        debug!("Created cache directory: {}", path.display());
    }
    Ok(())
}

async fn read_sidecar(path: &Path) -> CacheResult<Sidecar> {
    let raw = fs::read(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CacheError::NotFound {
            key: path.display().to_string(),
        },
        _ => CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    serde_json::from_slice(&raw).map_err(|e| CacheError::Metadata {
        path: path.to_path_buf(),
        source: e,
    })
}

async fn write_atomic(path: &Path, content: &[u8]) -> CacheResult<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(TEMP_FILE_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    if let Err(e) = fs::write(&temp_path, content).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(CacheError::Io {
            path: temp_path,
            source: e,
        });
    }

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> CacheResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
