//! Format detection and parsing of fetched dataset content
//!
//! [`auto`] picks a parser from the source URL's extension, falling back to
//! sniffing the first bytes of the content when the extension is missing or not
//! one we know. CSV is fully supported; Parquet is recognised but not decoded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::parse::SNIFF_BYTES;
use crate::errors::{ConfigError, ParseError, ParseResult};

pub mod tabular;
pub mod row;

pub use tabular::{dedupe_headers, normalize_header, parse_csv};
pub use row::{Row, Value};

/// Serialization formats published by the data repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Apache Parquet
    Parquet,
}

impl DataFormat {
    /// File extension without the leading dot
    pub const fn extension(self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Parquet => "parquet",
        }
    }

    /// The other published format
    pub const fn alternate(self) -> Self {
        match self {
            DataFormat::Csv => DataFormat::Parquet,
            DataFormat::Parquet => DataFormat::Csv,
        }
    }

    /// Format named by a file extension (case insensitive, no leading dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("csv") {
            Some(DataFormat::Csv)
        } else if extension.eq_ignore_ascii_case("parquet") {
            Some(DataFormat::Parquet)
        } else {
            None
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| ConfigError::UnknownFormat {
            value: s.to_string(),
        })
    }
}

/// Parse `bytes` fetched from `source_url` into row mappings
///
/// Detection order: URL extension (`.csv`, `.parquet`), then content sniffing.
/// Every cell is kept as a trimmed string; coercion is left to dataset mappers.
///
/// # Errors
///
/// * [`ParseError::ParquetNotImplemented`] for Parquet content
/// * [`ParseError::UnknownFormat`] when nothing identifies the content
/// * [`ParseError::EmptyInput`] / [`ParseError::Csv`] for unusable CSV
pub fn auto(bytes: &[u8], source_url: &str) -> ParseResult<Vec<Row>> {
    match detect_format(bytes, source_url) {
        Some(DataFormat::Csv) => parse_csv(bytes),
        Some(DataFormat::Parquet) => Err(ParseError::ParquetNotImplemented {
            url: source_url.to_string(),
        }),
        None => Err(ParseError::UnknownFormat {
            url: source_url.to_string(),
        }),
    }
}

/// Detect the format of `bytes` fetched from `source_url`
pub fn detect_format(bytes: &[u8], source_url: &str) -> Option<DataFormat> {
    format_from_url(source_url).or_else(|| sniff(bytes))
}

/// Format named by the extension of the URL's last path segment
pub fn format_from_url(source_url: &str) -> Option<DataFormat> {
    let path = match Url::parse(source_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => source_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let file_name = path.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    DataFormat::from_extension(extension)
}

fn sniff(bytes: &[u8]) -> Option<DataFormat> {
    let head = &bytes[..bytes.len().min(SNIFF_BYTES)];
    if head.starts_with(b"PAR1") {
        Some(DataFormat::Parquet)
    } else if head.contains(&b',') && head.contains(&b'\n') {
        Some(DataFormat::Csv)
    } else if head.contains(&b'\n') && is_plain_text(head) {
        // Single-column CSV has no comma
        Some(DataFormat::Csv)
    } else {
        None
    }
}

/// UTF-8 without control characters other than tabs and line breaks
///
/// A multi-byte character cut off by the sniff window still counts as text.
fn is_plain_text(head: &[u8]) -> bool {
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };
    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n'))
}
