//! Core fetch-cache-parse pipeline
//!
//! This module contains the components that turn a dataset descriptor into
//! typed records: the response cache, the conditional-GET fetch client, the
//! raw URL resolver, the format parser, season/week selection and the loading
//! orchestrator.
//!
//! # Examples
//!
//! ```rust,no_run
//! use nflverse_fetcher::app::{FetchContext, Loader, Row, Source};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Loader::from_env().await?;
//! let ctx = FetchContext::new();
//! let source = Source::new("nflverse/nflverse-data", "data/injuries/injuries");
//!
//! // 2024 file if published, otherwise the all-seasons file
//! let teams = loader
//!     .load_from_source(&ctx, &source, 2024, |row: &Row| row.upper(&["team"]))
//!     .await?;
//! println!("{} rows", teams.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod context;
pub mod loader;
pub mod parse;
pub mod select;
pub mod source;

// Re-export main public API
pub use cache::{
    build_response_cache, BlobCache, CacheConfig, CacheMode, CacheStats, FsCache, MemoryCache,
    Metadata, ResponseCache, Validators,
};
pub use client::{ClientConfig, FetchOptions, FetchResponse, Fetcher};
pub use context::FetchContext;
pub use loader::{Loaded, Loader};
pub use parse::{DataFormat, Row, Value};
pub use select::{current_season, SeasonWeeks, Selection, SelectionFilter};
pub use source::{raw_url, season_path, Source};
