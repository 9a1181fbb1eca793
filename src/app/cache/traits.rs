//! Core traits and types for the response cache.

use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CacheError, CacheResult};

/// Response body handed to a cache for persistence
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Response metadata kept alongside a cached body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// `ETag` header as received (weak validators kept intact)
    pub etag: Option<String>,
    /// Parsed `Last-Modified` header
    pub last_modified: Option<DateTime<Utc>>,
    /// `Content-Length` header, or the stored size for cached bodies
    pub content_length: Option<u64>,
}

impl Metadata {
    /// Validators carried by this metadata
    pub fn validators(&self) -> Validators {
        Validators {
            etag: self.etag.clone(),
            last_modified: self.last_modified,
        }
    }
}

/// Conditional-request validators for a cached resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    /// Sent as `If-None-Match`
    pub etag: Option<String>,
    /// Sent as `If-Modified-Since`
    pub last_modified: Option<DateTime<Utc>>,
}

impl Validators {
    /// Whether there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Capability interface shared by the response cache backends
///
/// Keys are exact request URLs. Entries older than the backend's TTL are never
/// offered as validators, so an expired entry always forces a full GET.
#[async_trait]
pub trait ResponseCache: Send + Sync + fmt::Debug {
    /// Validators for `url` when a non-expired entry exists
    async fn validators(&self, url: &str) -> Option<Validators>;

    /// Consume `body` once, persist it with `metadata`, and return a copy for the caller
    ///
    /// Persisting is best effort: only a failure while reading `body` is an error.
    async fn store_stream(
        &self,
        url: &str,
        metadata: Metadata,
        body: BodyStream,
    ) -> CacheResult<Bytes>;

    /// Previously stored body and metadata for `url`
    async fn open(&self, url: &str) -> CacheResult<(Bytes, Metadata)>;

    /// Remove every entry
    async fn clear(&self) -> CacheResult<()>;

    /// Remove expired entries, returning how many were dropped
    async fn cleanup(&self) -> CacheResult<usize>;
}

/// Drain a body stream into memory
pub(crate) async fn collect_body(key: &str, mut body: BodyStream) -> CacheResult<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| CacheError::Stream {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

#[cfg(test)]
pub(crate) fn body_from(chunks: &[&'static [u8]]) -> BodyStream {
    let items: Vec<io::Result<Bytes>> = chunks
        .iter()
        .map(|chunk| Ok(Bytes::from_static(chunk)))
        .collect();
    futures::stream::iter(items).boxed()
}
