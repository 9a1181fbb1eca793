//! Response caching for conditional HTTP fetches
//!
//! Two interchangeable backends implement [`ResponseCache`]: an in-process
//! [`MemoryCache`] and an on-disk [`FsCache`]. A fetcher holds at most one of
//! them; which one is decided by [`CacheMode`] via [`build_response_cache`].
//!
//! A cache entry is keyed by the exact request URL and holds the body plus the
//! `ETag` / `Last-Modified` validators from the response that produced it.
//! Entries past their TTL never produce validators, so the next fetch for that
//! URL is an unconditional GET that refreshes the entry.
//!
//! # Module Organization
//!
//! - [`traits`] - The backend trait and metadata types
//! - [`memory`] - `RwLock`-guarded in-memory backend
//! - [`filesystem`] - SHA-1 named body + JSON sidecar backend
//! - [`config`] - Backend selection and defaults
//! - [`stats`] - Disk usage reporting
//! - [`blob`] - Standalone key/bytes cache with memory and disk tiers
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use nflverse_fetcher::app::cache::{build_response_cache, CacheConfig, CacheMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::with_mode(CacheMode::Filesystem)
//!     .with_ttl(Duration::from_secs(3600));
//! let cache = build_response_cache(&config).await?;
//! assert!(cache.is_some());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::errors::CacheResult;

pub mod blob;
pub mod config;
pub mod filesystem;
pub mod memory;
pub mod stats;
pub mod traits;

// Re-export main public API
pub use blob::{BlobCache, BlobMode, BlobOptions};
pub use config::{default_cache_dir, CacheConfig, CacheMode};
pub use filesystem::{FsCache, Sidecar};
pub use memory::MemoryCache;
pub use stats::{format_bytes, CacheStats};
pub use traits::{BodyStream, Metadata, ResponseCache, Validators};

/// Build the response cache selected by `config`
///
/// Returns `None` for [`CacheMode::Off`].
///
/// # Errors
///
/// Returns `CacheError` if the filesystem backend's directory cannot be
/// determined or created
pub async fn build_response_cache(
    config: &CacheConfig,
) -> CacheResult<Option<Arc<dyn ResponseCache>>> {
    let cache: Arc<dyn ResponseCache> = match config.mode {
        CacheMode::Off => {
            debug!("Response cache disabled");
            return Ok(None);
        }
        CacheMode::Memory => Arc::new(MemoryCache::new(config.ttl)),
        CacheMode::Filesystem => Arc::new(FsCache::new(config.resolved_root()?, config.ttl).await?),
    };
    debug!("Using {} response cache", config.mode);
    Ok(Some(cache))
}
