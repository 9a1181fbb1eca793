//! Prelude module for the nflverse fetcher library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use nflverse_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use nflverse_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let loader = Loader::from_env().await?;
//!     let ctx = FetchContext::with_timeout(std::time::Duration::from_secs(60));
//!
//!     let snaps = snap_counts::load_seasons(&loader, &ctx, &[2022, 2023]).await?;
//!     println!("{} snap count rows", snaps.len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Pipeline components
pub use crate::app::{
    CacheConfig, CacheMode, ClientConfig, DataFormat, FetchContext, FetchOptions, Fetcher,
    FsCache, Loaded, Loader, MemoryCache, ResponseCache, Row, SeasonWeeks, Selection, Source,
};

// Configuration
pub use crate::config::{AppConfig, ConfigOverrides};

// Datasets
pub use crate::datasets::{
    injuries, players, snap_counts, team_stats, DatasetKey, Injury, Player, SnapCount, TeamStat,
};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;
