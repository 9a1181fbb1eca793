//! Configuration management for nflverse_fetcher
//!
//! Settings come from several sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. A TOML config file (explicit path, `./nflverse-fetcher.toml`, or the
//!    user config directory)
//! 3. A `.env` file in the working directory
//! 4. `NFLVERSE_*` process environment variables
//! 5. Explicit [`ConfigOverrides`] (CLI flags, library callers)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::cache::{CacheConfig, CacheMode};
use crate::app::client::ClientConfig;
use crate::app::parse::DataFormat;
use crate::constants::{self, config as files, env};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Response cache settings
    pub cache: CacheConfig,
    /// HTTP client settings
    pub client: ClientConfig,
    /// Format requested for datasets whose path carries no extension
    pub prefer: DataFormat,
    /// Retry a failed download in the other format
    pub format_fallback: bool,
    /// Raw-content host that dataset URLs are resolved against
    pub raw_host: String,
    /// Verbose logging
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            client: ClientConfig::default(),
            prefer: DataFormat::default(),
            format_fallback: false,
            raw_host: constants::RAW_HOST.to_string(),
            verbose: false,
        }
    }
}

/// Highest-precedence settings, typically from command-line flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub cache_mode: Option<CacheMode>,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: Option<Duration>,
    pub prefer: Option<DataFormat>,
    pub format_fallback: Option<bool>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub raw_host: Option<String>,
    pub verbose: Option<bool>,
}

impl AppConfig {
    /// Load configuration with multi-source precedence
    ///
    /// # Errors
    ///
    /// * `ConfigError::NotFound` if `config_file` is given but missing
    /// * `ConfigError::InvalidFormat` for a malformed TOML file
    /// * `ConfigError::DotEnv` for a malformed `.env` file
    /// * `ConfigError::InvalidValue` naming the offending variable
    pub async fn load(
        config_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> ConfigResult<Self> {
        let mut config = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::load_from_file(path).await?,
            None => match Self::find_config_file() {
                Some(path) => Self::load_from_file(&path).await?,
                None => Self::default(),
            },
        };

        let dotenv = read_dotenv(Path::new(files::DOTENV_FILE_NAME))?;
        config.apply_vars(|key| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.is_empty())
                .or_else(|| dotenv.get(key).cloned())
        })?;
        config.apply_overrides(overrides);

        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Apply `NFLVERSE_*` variables resolved through `lookup`
    ///
    /// Empty values are treated as unset.
    pub fn apply_vars<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get(env::CACHE) {
            self.cache.mode = parse_var(env::CACHE, &value)?;
        }
        if let Some(value) = get(env::CACHE_DIR) {
            self.cache.cache_root = Some(PathBuf::from(value));
        }
        if let Some(value) = get(env::CACHE_DURATION) {
            self.cache.ttl = Duration::from_secs(parse_var(env::CACHE_DURATION, &value)?);
        }
        if let Some(value) = get(env::PREFER) {
            self.prefer = parse_var(env::PREFER, &value)?;
        }
        if let Some(value) = get(env::FORMAT_FALLBACK) {
            self.format_fallback = parse_bool(env::FORMAT_FALLBACK, &value)?;
        }
        if let Some(value) = get(env::TIMEOUT) {
            let secs: u64 = parse_var(env::TIMEOUT, &value)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: env::TIMEOUT.to_string(),
                    value,
                    reason: "Timeout must be at least one second".to_string(),
                });
            }
            self.client.request_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get(env::USER_AGENT) {
            self.client.user_agent = value;
        }
        if let Some(value) = get(env::VERBOSE) {
            self.verbose = parse_bool(env::VERBOSE, &value)?;
        }
        if let Some(value) = get(env::RAW_HOST) {
            self.raw_host = value;
        }
        Ok(())
    }

    /// Apply explicit overrides
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(mode) = overrides.cache_mode {
            self.cache.mode = mode;
        }
        if let Some(dir) = &overrides.cache_dir {
            self.cache.cache_root = Some(dir.clone());
        }
        if let Some(ttl) = overrides.cache_ttl {
            self.cache.ttl = ttl;
        }
        if let Some(prefer) = overrides.prefer {
            self.prefer = prefer;
        }
        if let Some(fallback) = overrides.format_fallback {
            self.format_fallback = fallback;
        }
        if let Some(timeout) = overrides.timeout {
            self.client.request_timeout = timeout;
        }
        if let Some(user_agent) = &overrides.user_agent {
            self.client.user_agent = user_agent.clone();
        }
        if let Some(raw_host) = &overrides.raw_host {
            self.raw_host = raw_host.clone();
        }
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_FILE_NAME)];
        if let Ok(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::DirectoryUnavailable {
            purpose: "user configuration".to_string(),
        })?;

        Ok(config_dir
            .join(constants::cache::DIR_NAME)
            .join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

/// Read `KEY=value` pairs from a dotenv file without touching the process environment
///
/// A missing file yields no pairs.
pub fn read_dotenv(path: &Path) -> ConfigResult<HashMap<String, String>> {
    let iter = match dotenv::from_path_iter(path) {
        Ok(iter) => iter,
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HashMap::new())
        }
        Err(e) => {
            return Err(ConfigError::DotEnv {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    iter.map(|item| {
        item.map_err(|e| ConfigError::DotEnv {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
    .collect()
}

/// Parse a boolean flag: `1/true/yes/on` or `0/false/no/off`
pub fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected one of 1/true/yes/on or 0/false/no/off".to_string(),
        }),
    }
}

fn parse_var<T>(field: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache.mode, CacheMode::Memory);
        assert_eq!(config.cache.ttl, Duration::from_secs(86_400));
        assert_eq!(config.prefer, DataFormat::Csv);
        assert!(!config.format_fallback);
        assert_eq!(config.client.request_timeout, Duration::from_secs(30));
        assert_eq!(config.raw_host, "https://raw.githubusercontent.com");
        assert!(!config.verbose);
    }

    #[test]
    fn test_apply_all_vars() {
        let mut config = AppConfig::default();
        config
            .apply_vars(vars(&[
                ("NFLVERSE_CACHE", "disk"),
                ("NFLVERSE_CACHE_DIR", "/tmp/nfl-cache"),
                ("NFLVERSE_CACHE_DURATION", "600"),
                ("NFLVERSE_PREFER", "parquet"),
                ("NFLVERSE_FORMAT_FALLBACK", "on"),
                ("NFLVERSE_TIMEOUT", "12"),
                ("NFLVERSE_USER_AGENT", "tests/1.0"),
                ("NFLVERSE_VERBOSE", "yes"),
                ("NFLVERSE_RAW_HOST", "http://localhost:9000"),
            ]))
            .unwrap();

        assert_eq!(config.cache.mode, CacheMode::Filesystem);
        assert_eq!(config.cache.cache_root, Some(PathBuf::from("/tmp/nfl-cache")));
        assert_eq!(config.cache.ttl, Duration::from_secs(600));
        assert_eq!(config.prefer, DataFormat::Parquet);
        assert!(config.format_fallback);
        assert_eq!(config.client.request_timeout, Duration::from_secs(12));
        assert_eq!(config.client.user_agent, "tests/1.0");
        assert!(config.verbose);
        assert_eq!(config.raw_host, "http://localhost:9000");
    }

    #[test]
    fn test_empty_vars_are_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_vars(vars(&[("NFLVERSE_CACHE", ""), ("NFLVERSE_TIMEOUT", "  ")]))
            .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_var_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_vars(vars(&[("NFLVERSE_CACHE_DURATION", "a day")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "NFLVERSE_CACHE_DURATION");
                assert_eq!(value, "a day");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }

        let err = config
            .apply_vars(vars(&[("NFLVERSE_CACHE", "redis")]))
            .unwrap_err();
        assert!(err.to_string().contains("NFLVERSE_CACHE"));

        let err = config
            .apply_vars(vars(&[("NFLVERSE_TIMEOUT", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["1", "true", "TRUE", "yes", "on"] {
            assert!(parse_bool("F", truthy).unwrap(), "{}", truthy);
        }
        for falsy in ["0", "false", "No", "off"] {
            assert!(!parse_bool("F", falsy).unwrap(), "{}", falsy);
        }
        assert!(parse_bool("F", "maybe").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = AppConfig::default();
        config
            .apply_vars(vars(&[("NFLVERSE_CACHE", "memory"), ("NFLVERSE_TIMEOUT", "10")]))
            .unwrap();
        config.apply_overrides(&ConfigOverrides {
            cache_mode: Some(CacheMode::Off),
            format_fallback: Some(true),
            timeout: Some(Duration::from_secs(3)),
            ..Default::default()
        });

        assert_eq!(config.cache.mode, CacheMode::Off);
        assert!(config.format_fallback);
        assert_eq!(config.client.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_read_dotenv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        std::fs::write(
            &path,
            "# comment\nNFLVERSE_CACHE=filesystem\nNFLVERSE_USER_AGENT=\"quoted agent\"\n",
        )
        .unwrap();

        let pairs = read_dotenv(&path).unwrap();
        assert_eq!(pairs.get("NFLVERSE_CACHE").map(String::as_str), Some("filesystem"));
        assert_eq!(
            pairs.get("NFLVERSE_USER_AGENT").map(String::as_str),
            Some("quoted agent")
        );

        assert!(read_dotenv(&temp_dir.path().join("missing.env")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = AppConfig::load(Some(&config_path), &ConfigOverrides::default()).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
prefer = "parquet"

[cache]
mode = "filesystem"
ttl = "1h"

[client]
request_timeout = "90s"
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load_from_file(&config_path).await.unwrap();
        assert_eq!(config.prefer, DataFormat::Parquet);
        assert_eq!(config.cache.mode, CacheMode::Filesystem);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.client.request_timeout, Duration::from_secs(90));
        // Unspecified values keep their defaults
        assert_eq!(config.client.connect_timeout, Duration::from_secs(10));
        assert!(!config.verbose);
    }

    #[tokio::test]
    async fn test_invalid_toml_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        tokio::fs::write(&config_path, "cache = [").await.unwrap();

        let result = AppConfig::load_from_file(&config_path).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }
}
