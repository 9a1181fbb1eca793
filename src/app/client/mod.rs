//! HTTP fetch client with conditional GET and response caching
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Request construction, header metadata and error previews
//!
//! [`Fetcher::fetch`] performs one GET per call. When a [`ResponseCache`] is
//! attached, stored validators turn the GET into a conditional request and a
//! `304 Not Modified` is answered from the cache. Nothing is retried here.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Response, StatusCode};
use tracing::{debug, info};

use crate::app::cache::{build_response_cache, Metadata, ResponseCache};
use crate::app::context::FetchContext;
use crate::config::AppConfig;
use crate::errors::{FetchError, FetchResult, Result};

pub mod config;
pub mod http;

pub use config::ClientConfig;

use http::HttpHandler;

/// Body of a [`FetchResponse`]
#[derive(Debug)]
enum ResponseBody {
    /// Already in memory (cache hit or cache write-through)
    Buffered(Bytes),
    /// Unread network body
    Streaming(Response),
}

/// Result of a successful fetch
#[derive(Debug)]
pub struct FetchResponse {
    url: String,
    metadata: Metadata,
    from_cache: bool,
    body: ResponseBody,
    ctx: FetchContext,
}

impl FetchResponse {
    /// The requested URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Validators and length reported for the body
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the body was served from the cache after a 304
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Whether the body still has to be read from the network
    pub fn is_streaming(&self) -> bool {
        matches!(self.body, ResponseBody::Streaming(_))
    }

    /// Read the whole body
    ///
    /// Network reads run under the context the response was fetched with, so
    /// the caller's deadline and cancellation still apply.
    pub async fn bytes(self) -> FetchResult<Bytes> {
        let FetchResponse { url, body, ctx, .. } = self;
        match body {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Streaming(response) => {
                ctx.run(&url, async {
                    response.bytes().await.map_err(|e| FetchError::Body {
                        url: url.clone(),
                        source: e,
                    })
                })
                .await
            }
        }
    }
}

/// Per-call fetch behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip cached validators so the server sends the full body again.
    /// The fresh response still replaces the cached entry.
    pub force_refresh: bool,
}

impl FetchOptions {
    /// Options that bypass cached validators
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

/// Conditional-GET fetch client
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: HttpHandler,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl Fetcher {
    /// Create a fetcher from client settings and an optional cache
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the HTTP client cannot be built
    pub fn new(config: &ClientConfig, cache: Option<Arc<dyn ResponseCache>>) -> FetchResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self::with_client(client, cache))
    }

    /// Create a fetcher around an existing `reqwest` client
    pub fn with_client(client: reqwest::Client, cache: Option<Arc<dyn ResponseCache>>) -> Self {
        Self {
            http: HttpHandler::new(client),
            cache,
        }
    }

    /// Create a fetcher from application configuration, building the configured cache
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the cache backend cannot be created
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let cache = build_response_cache(&config.cache).await?;
        info!(
            "Created fetcher (cache: {}, timeout: {:?})",
            config.cache.mode, config.client.request_timeout
        );
        Ok(Self::new(&config.client, cache)?)
    }

    /// The attached cache, if any
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    /// Fetch `url`
    ///
    /// # Errors
    ///
    /// * `FetchError::NotFound` for HTTP 404
    /// * `FetchError::Http` for any other non-200, non-304 status
    /// * `FetchError::NotModifiedWithoutCache` for a 304 with no cache attached
    /// * `FetchError::Timeout` / `FetchError::Cancelled` when `ctx` interrupts
    /// * `FetchError::Request` / `FetchError::Cache` for transport or cache failures
    pub async fn fetch(&self, ctx: &FetchContext, url: &str) -> FetchResult<FetchResponse> {
        self.fetch_with(ctx, url, FetchOptions::default()).await
    }

    /// Fetch `url` with per-call options
    ///
    /// # Errors
    ///
    /// Same as [`Fetcher::fetch`]
    pub async fn fetch_with(
        &self,
        ctx: &FetchContext,
        url: &str,
        options: FetchOptions,
    ) -> FetchResult<FetchResponse> {
        ctx.run(url, self.fetch_inner(ctx, url, options)).await
    }

    async fn fetch_inner(
        &self,
        ctx: &FetchContext,
        url: &str,
        options: FetchOptions,
    ) -> FetchResult<FetchResponse> {
        let validators = match &self.cache {
            Some(_) if options.force_refresh => {
                debug!("Bypassing cached validators for {}", url);
                None
            }
            Some(cache) => cache.validators(url).await,
            None => None,
        };

        let response = self
            .http
            .conditional_get(url, validators.as_ref().filter(|v| !v.is_empty()))
            .await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);

        match status {
            StatusCode::OK => {
                let metadata = http::extract_metadata(response.headers());
                let body = match &self.cache {
                    Some(cache) => {
                        let stream = response
                            .bytes_stream()
                            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
                            .boxed();
                        let bytes = cache.store_stream(url, metadata.clone(), stream).await?;
                        ResponseBody::Buffered(bytes)
                    }
                    None => ResponseBody::Streaming(response),
                };
                Ok(FetchResponse {
                    url: url.to_string(),
                    metadata,
                    from_cache: false,
                    body,
                    ctx: ctx.clone(),
                })
            }
            StatusCode::NOT_MODIFIED => {
                let cache = self
                    .cache
                    .as_ref()
                    .ok_or_else(|| FetchError::NotModifiedWithoutCache {
                        url: url.to_string(),
                    })?;
                let (bytes, metadata) = cache.open(url).await?;
                debug!("Serving {} from cache ({} bytes)", url, bytes.len());
                Ok(FetchResponse {
                    url: url.to_string(),
                    metadata,
                    from_cache: true,
                    body: ResponseBody::Buffered(bytes),
                    ctx: ctx.clone(),
                })
            }
            StatusCode::NOT_FOUND => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
            _ => Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                preview: http::read_preview(response).await,
            }),
        }
    }
}
