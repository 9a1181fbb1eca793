//! Command-line argument parsing for nflverse fetcher
//!
//! This module defines the CLI structure using clap derive macros: loading
//! datasets as JSON lines, resolving dataset URLs, issuing raw conditional
//! fetches and maintaining the on-disk response cache.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::app::cache::CacheMode;
use crate::app::parse::DataFormat;
use crate::app::select::{SeasonWeeks, Selection};
use crate::config::ConfigOverrides;
use crate::errors::ConfigResult;

/// nflverse fetcher - Fetch, cache and parse nflverse NFL datasets
#[derive(Parser, Debug)]
#[command(
    name = "nflverse_fetcher",
    version,
    about = "Fetch, cache and parse nflverse NFL datasets",
    long_about = "Downloads nflverse datasets from GitHub with conditional requests, caches the
responses in memory or on disk, and prints the parsed records as JSON lines.
Season-scoped requests fall back to the all-seasons file when no per-season file exists."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - only errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache directory path
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Response cache backend: memory, filesystem or off
    #[arg(long, global = true, value_name = "MODE")]
    pub cache: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Preferred file format for datasets: csv or parquet
    #[arg(long, global = true, value_name = "FORMAT")]
    pub prefer: Option<String>,

    /// Retry a failed dataset download in the other format
    #[arg(long, global = true)]
    pub format_fallback: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a dataset and print its records as JSON lines
    Load(LoadArgs),

    /// Print the URL a dataset resolves to
    Url(UrlArgs),

    /// Fetch a URL and report its metadata
    Raw(RawArgs),

    /// Response cache maintenance
    Cache(CacheArgs),
}

/// Arguments for the load command
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Dataset name (e.g. "snapcounts", "players", "injuries")
    pub dataset: String,

    /// Season to load; repeat for several. Omit for the all-seasons file
    #[arg(short, long = "season", value_name = "YEAR")]
    pub seasons: Vec<i32>,

    /// Keep only this week; repeat for several. Without a season, applies to
    /// the current season
    #[arg(short, long = "week", value_name = "WEEK")]
    pub weeks: Vec<i32>,

    /// Maximum number of records to print
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Report the URL each season was loaded from and whether it fell back
    #[arg(long)]
    pub provenance: bool,

    /// Download again even when a cached copy could be revalidated
    #[arg(long)]
    pub refresh: bool,
}

impl LoadArgs {
    /// Seasons and weeks requested on the command line
    pub fn selection(&self) -> Selection {
        match (self.seasons.is_empty(), self.weeks.is_empty()) {
            (true, true) => Selection::All,
            (false, true) => Selection::seasons(self.seasons.clone()),
            (true, false) => Selection::Weeks(self.weeks.clone()),
            (false, false) => Selection::SeasonWeeks(
                self.seasons
                    .iter()
                    .map(|&season| SeasonWeeks::new(season, self.weeks.clone()))
                    .collect(),
            ),
        }
    }
}

/// Arguments for the url command
#[derive(Args, Debug, Clone)]
pub struct UrlArgs {
    /// Dataset name
    pub dataset: String,

    /// Season; omit for the all-seasons file
    #[arg(short, long, value_name = "YEAR", default_value_t = 0)]
    pub season: i32,
}

/// Arguments for the raw command
#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    /// URL to fetch
    pub url: String,

    /// Write the body to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip cached validators and download the full body
    #[arg(long)]
    pub refresh: bool,
}

/// Arguments for cache management
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache management actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Show cache location, entry count and size
    Info,

    /// Remove every cached response
    Clear,

    /// Remove expired responses
    Cleanup,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

impl GlobalArgs {
    /// Configuration overrides given on the command line
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown cache mode or format
    pub fn to_overrides(&self) -> ConfigResult<ConfigOverrides> {
        let cache_mode = self
            .cache
            .as_deref()
            .map(str::parse::<CacheMode>)
            .transpose()?;
        let prefer = self
            .prefer
            .as_deref()
            .map(str::parse::<DataFormat>)
            .transpose()?;

        Ok(ConfigOverrides {
            cache_mode,
            cache_dir: self.cache_dir.clone(),
            prefer,
            timeout: self.timeout.map(Duration::from_secs),
            format_fallback: self.format_fallback.then_some(true),
            verbose: self.verbose.then_some(true),
            ..ConfigOverrides::default()
        })
    }
}
