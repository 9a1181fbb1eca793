//! Application constants for nflverse_fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for configuration overrides
pub mod env {
    /// Cache mode: memory, filesystem or off
    pub const CACHE: &str = "NFLVERSE_CACHE";

    /// Cache directory for the filesystem backend
    pub const CACHE_DIR: &str = "NFLVERSE_CACHE_DIR";

    /// Cache TTL in seconds
    pub const CACHE_DURATION: &str = "NFLVERSE_CACHE_DURATION";

    /// Preferred data format: csv or parquet
    pub const PREFER: &str = "NFLVERSE_PREFER";

    /// Retry a failed download in the other format
    pub const FORMAT_FALLBACK: &str = "NFLVERSE_FORMAT_FALLBACK";

    /// HTTP timeout in seconds
    pub const TIMEOUT: &str = "NFLVERSE_TIMEOUT";

    /// User-Agent header value
    pub const USER_AGENT: &str = "NFLVERSE_USER_AGENT";

    /// Verbose logging flag
    pub const VERBOSE: &str = "NFLVERSE_VERBOSE";

    /// Raw-content host override (mirrors, local testing)
    pub const RAW_HOST: &str = "NFLVERSE_RAW_HOST";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("nflverse_fetcher/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;

    /// Upper bound on the error body preview kept for diagnostics (8KB)
    pub const ERROR_PREVIEW_BYTES: usize = 8 * 1024;
}

/// GitHub raw-content addressing
pub mod github {
    /// Raw file host
    pub const RAW_HOST: &str = "https://raw.githubusercontent.com";

    /// Owner used when a repository identifier has no `owner/` prefix
    pub const DEFAULT_OWNER: &str = "nflverse";

    /// Branch every nflverse data repository publishes from
    pub const BRANCH: &str = "master";

    /// Main nflverse data repository
    pub const NFLVERSE_DATA: &str = "nflverse/nflverse-data";
}

/// Cache constants
pub mod cache {
    use super::Duration;

    /// Default entry lifetime
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Extension of cached response bodies
    pub const DATA_EXTENSION: &str = "data";

    /// Extension of sidecar metadata files
    pub const META_EXTENSION: &str = "json";

    /// Suffix for in-progress writes, renamed into place when complete
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Extension of blob cache files
    pub const BLOB_EXTENSION: &str = "blob";

    /// Directory name under the user cache directory
    pub const DIR_NAME: &str = "nflverse_fetcher";

    /// Default memory entry cap for the blob cache
    pub const BLOB_MAX_MEMORY_ENTRIES: usize = 256;
}

/// Content parsing constants
pub mod parse {
    /// Number of leading bytes inspected when sniffing content
    pub const SNIFF_BYTES: usize = 512;
}

/// NFL calendar
pub mod season {
    /// Month (1-based) in which a new season kicks off
    pub const START_MONTH: u32 = 9;
}

/// Configuration file locations
pub mod config {
    /// Project-local config file name
    pub const LOCAL_FILE_NAME: &str = "nflverse-fetcher.toml";

    /// Dotenv file name looked up in the working directory
    pub const DOTENV_FILE_NAME: &str = ".env";
}

// Re-export commonly used constants for convenience
pub use github::{BRANCH, DEFAULT_OWNER, RAW_HOST};
pub use http::USER_AGENT;
