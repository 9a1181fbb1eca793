//! Error types for nflverse_fetcher
//!
//! This module defines the error types for every component of the fetch-cache-parse
//! pipeline. Errors carry the offending URL, path or value so that failures surfaced
//! to callers are actionable without extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Response and blob cache errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// No entry stored for the key, or the entry has expired
    #[error("No cached entry for {key}")]
    NotFound { key: String },

    /// I/O error while reading or writing a cache file
    #[error("Cache I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar metadata could not be read or written
    #[error("Invalid cache metadata at {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Glob pattern passed to a clear operation is malformed
    #[error("Invalid cache key pattern: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Cache directory not found or inaccessible
    #[error("Cache directory not accessible: {path}")]
    DirectoryNotAccessible { path: PathBuf },

    /// Reading the response body failed while it was being stored
    #[error("Failed to read response body for {key}: {reason}")]
    Stream { key: String, reason: String },
}

/// HTTP fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Server answered 404 for the requested resource
    #[error("Resource not found (HTTP 404): {url}")]
    NotFound { url: String },

    /// Server returned any other non-success status
    #[error("HTTP {status} for {url}{}", format_preview(.preview))]
    Http {
        url: String,
        status: u16,
        preview: String,
    },

    /// A 304 response arrived but there is no cache to serve it from
    #[error("Received 304 Not Modified for {url} but no response cache is attached")]
    NotModifiedWithoutCache { url: String },

    /// The caller's deadline elapsed before the operation completed
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The caller cancelled the operation
    #[error("Request to {url} was cancelled")]
    Cancelled { url: String },

    /// Transport-level failure (DNS, connection reset, TLS, ...)
    #[error("HTTP request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Reading the response body failed
    #[error("Failed reading response body from {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Cache backend failure during store or open
    #[error(transparent)]
    Cache(#[from] CacheError),
}

fn format_preview(preview: &str) -> String {
    if preview.is_empty() {
        String::new()
    } else {
        format!(": {}", preview)
    }
}

impl FetchError {
    /// Whether this error means the resource does not exist upstream
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }

    /// Whether this error was caused by the caller's deadline or cancellation
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            FetchError::Timeout { .. } | FetchError::Cancelled { .. }
        )
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::NotFound { .. } => Some(404),
            FetchError::Http { status, .. } => Some(*status),
            FetchError::NotModifiedWithoutCache { .. } => Some(304),
            _ => None,
        }
    }
}

/// Content parsing errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Parquet decoding is not available
    #[error("Parquet parsing is not implemented yet (source: {url}). Request the CSV asset instead")]
    ParquetNotImplemented { url: String },

    /// Neither the URL nor the content identify a supported format
    #[error("Unknown content type for {url}; cannot parse")]
    UnknownFormat { url: String },

    /// Input has no header record
    #[error("Input is empty; expected a CSV header record")]
    EmptyInput,

    /// Malformed CSV
    #[error("CSV parsing failed")]
    Csv(#[from] csv::Error),
}

/// Errors from the dataset loading orchestrator
#[derive(Error, Debug)]
pub enum LoadError {
    /// Fetching a resolved URL failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetched content could not be parsed
    #[error("Failed to parse {url}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// Whether the underlying failure is an upstream not-found
    pub fn is_not_found(&self) -> bool {
        match self {
            LoadError::Fetch(e) => e.is_not_found(),
            LoadError::Parse { .. } => false,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// A `.env` file exists but could not be parsed
    #[error("Failed to parse .env file {path}: {reason}")]
    DotEnv { path: PathBuf, reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Unrecognized cache mode string
    #[error("Unknown cache mode: {value}. Expected memory, filesystem or off")]
    UnknownCacheMode { value: String },

    /// Unrecognized data format string
    #[error("Unknown data format: {value}. Expected csv or parquet")]
    UnknownFormat { value: String },

    /// Unrecognized dataset name
    #[error("Unknown dataset: {name}")]
    UnknownDataset { name: String },

    /// No usable default directory on this platform
    #[error("Could not determine a default directory for {purpose}")]
    DirectoryUnavailable { purpose: String },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Load error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            AppError::Fetch(e) | AppError::Load(LoadError::Fetch(e)) => Some(e),
            _ => None,
        }
    }

    /// Check if the error is recoverable (transient)
    ///
    /// Only transport failures and caller-imposed timeouts qualify. Retrying is
    /// left to the caller; nothing in this crate retries on its own.
    pub fn is_recoverable(&self) -> bool {
        match self.fetch_error() {
            Some(FetchError::Timeout { .. })
            | Some(FetchError::Request { .. })
            | Some(FetchError::Body { .. }) => true,
            Some(FetchError::Http { status, .. }) => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the error is an upstream not-found
    pub fn is_not_found(&self) -> bool {
        self.fetch_error().is_some_and(FetchError::is_not_found)
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Fetch(e) | AppError::Load(LoadError::Fetch(e)) => fetch_category(e),
            AppError::Cache(_) => "cache",
            AppError::Parse(_) | AppError::Load(LoadError::Parse { .. }) => "format",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

fn fetch_category(error: &FetchError) -> &'static str {
    match error {
        FetchError::NotFound { .. } => "not_found",
        FetchError::NotModifiedWithoutCache { .. } | FetchError::Client(_) => "config",
        FetchError::Timeout { .. }
        | FetchError::Cancelled { .. }
        | FetchError::Request { .. }
        | FetchError::Body { .. } => "transient",
        FetchError::Http { .. } => "http",
        FetchError::Cache(_) => "cache",
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Parse result type alias
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Load result type alias
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
