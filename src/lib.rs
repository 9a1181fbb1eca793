//! nflverse fetcher library
//!
//! Fetches versioned NFL datasets published as CSV or Parquet files in the
//! nflverse GitHub repositories, caches responses with conditional requests,
//! and parses them into typed records.
//!
//! The pipeline lives in [`app`]: a [`Loader`](app::Loader) resolves a
//! [`Source`](app::Source) to a raw URL, a [`Fetcher`](app::Fetcher) performs a
//! conditional GET against an optional response cache, and the parser turns the
//! body into [`Row`](app::Row)s for a caller-supplied mapper. Season-scoped
//! requests that come back not-found fall back to the all-seasons file.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod datasets;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
