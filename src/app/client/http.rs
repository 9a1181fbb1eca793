//! Core HTTP operations for conditional GETs
//!
//! Builds requests with cache validators, extracts response metadata and
//! captures bounded body previews for error reporting.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, Response};

use crate::app::cache::{Metadata, Validators};
use crate::constants::http::ERROR_PREVIEW_BYTES;
use crate::errors::{FetchError, FetchResult};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issue a GET, adding `If-None-Match` / `If-Modified-Since` from `validators`
    ///
    /// The response is returned whatever its status; only transport failures
    /// are errors here.
    pub async fn conditional_get(
        &self,
        url: &str,
        validators: Option<&Validators>,
    ) -> FetchResult<Response> {
        let mut request = self.client.get(url);

        if let Some(validators) = validators {
            if let Some(etag) = &validators.etag {
                request = request.header(header::IF_NONE_MATCH, etag.as_str());
            }
            if let Some(last_modified) = validators.last_modified {
                request = request.header(header::IF_MODIFIED_SINCE, format_http_date(last_modified));
            }
            tracing::debug!("Sending conditional GET for {}", url);
        }

        request.send().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Metadata carried by response headers
pub fn extract_metadata(headers: &HeaderMap) -> Metadata {
    Metadata {
        etag: header_text(headers, header::ETAG).map(str::to_string),
        last_modified: header_text(headers, header::LAST_MODIFIED).and_then(parse_http_date),
        content_length: header_text(headers, header::CONTENT_LENGTH)
            .and_then(|value| value.parse().ok()),
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Read at most [`ERROR_PREVIEW_BYTES`] of a response body as lossy UTF-8
///
/// Read failures just end the preview early.
pub async fn read_preview(mut response: Response) -> String {
    let mut buffer = Vec::new();
    while buffer.len() < ERROR_PREVIEW_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(ERROR_PREVIEW_BYTES - buffer.len());
                buffer.extend_from_slice(&chunk[..take]);
            }
            Ok(None) | Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buffer).trim().to_string()
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP date in IMF-fixdate, RFC 850 or asctime form
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    [RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
