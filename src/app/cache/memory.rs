//! In-memory response cache with TTL expiry

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::{CacheError, CacheResult};

use super::traits::{collect_body, BodyStream, Metadata, ResponseCache, Validators};

#[derive(Debug, Clone)]
struct MemoryEntry {
    body: Vec<u8>,
    metadata: Metadata,
    stored_at: Instant,
}

/// Response cache held in process memory
///
/// Readers share the lock; writers exclude everyone. Bodies are copied on the
/// way in and on the way out so callers can never alias cached buffers. There is
/// no capacity bound.
#[derive(Debug)]
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    /// Create a cache whose entries live for `ttl` (zero disables expiry)
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Configured entry lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the backing map is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Whether an entry for `url` is held, expired or not
    pub async fn contains(&self, url: &str) -> bool {
        self.entries.read().await.contains_key(url)
    }

    fn is_expired(&self, entry: &MemoryEntry, now: Instant) -> bool {
        !self.ttl.is_zero() && now.duration_since(entry.stored_at) > self.ttl
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn validators(&self, url: &str) -> Option<Validators> {
        let entries = self.entries.read().await;
        let entry = entries.get(url)?;
        if self.is_expired(entry, Instant::now()) {
            return None;
        }
        Some(entry.metadata.validators())
    }

    async fn store_stream(
        &self,
        url: &str,
        metadata: Metadata,
        body: BodyStream,
    ) -> CacheResult<Bytes> {
        let body = collect_body(url, body).await?;
        let entry = MemoryEntry {
            body: body.clone(),
            metadata,
            stored_at: Instant::now(),
        };

        self.entries.write().await.insert(url.to_string(), entry);
        debug!("Stored {} bytes in memory cache for {}", body.len(), url);

        Ok(Bytes::from(body))
    }

    async fn open(&self, url: &str) -> CacheResult<(Bytes, Metadata)> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(url) {
                None => {
                    return Err(CacheError::NotFound {
                        key: url.to_string(),
                    })
                }
                Some(entry) if !self.is_expired(entry, now) => {
                    return Ok((Bytes::copy_from_slice(&entry.body), entry.metadata.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock, re-checking in case a writer refreshed it.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(url) {
            if !self.is_expired(entry, Instant::now()) {
                return Ok((Bytes::copy_from_slice(&entry.body), entry.metadata.clone()));
            }
            entries.remove(url);
            debug!("Evicted expired memory cache entry for {}", url);
        }

        Err(CacheError::NotFound {
            key: url.to_string(),
        })
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn cleanup(&self) -> CacheResult<usize> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        Ok(before - entries.len())
    }
}
