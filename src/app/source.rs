//! Raw-file URL resolution for GitHub-hosted datasets
//!
//! Datasets live in GitHub repositories and are served from the raw-content host.
//! A [`Source`] names the repository and the logical base path of a dataset
//! family; seasons are addressed by suffixing the base path with `_<season>`.

use crate::app::parse::DataFormat;
use crate::constants::github;

/// Where a dataset family lives in a GitHub repository
///
/// `repo` is either `owner/name` or a bare `name` (owner defaults to `nflverse`).
/// `base` is the logical path without season suffix, e.g. `data/snap_counts/snap_counts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    /// Repository identifier
    pub repo: &'static str,
    /// Base logical path
    pub base: &'static str,
}

impl Source {
    /// Create a source descriptor
    pub const fn new(repo: &'static str, base: &'static str) -> Self {
        Self { repo, base }
    }

    /// Logical path for `season`, with the extension of `format` appended when
    /// the base path carries none
    ///
    /// A base that already names a format keeps it; the season suffix goes
    /// before the extension.
    pub fn path(&self, season: i32, format: DataFormat) -> String {
        match self.base.rsplit_once('.') {
            Some((stem, ext)) if DataFormat::from_extension(ext).is_some() => {
                format!("{}.{}", season_path(stem, season), ext)
            }
            _ => format!("{}.{}", season_path(self.base, season), format.extension()),
        }
    }

    /// Raw URL for `season` in `format`
    pub fn url(&self, season: i32, format: DataFormat) -> String {
        raw_url(self.repo, &self.path(season, format))
    }

    /// Like [`Source::url`], against a different raw-content host
    pub fn url_at(&self, host: &str, season: i32, format: DataFormat) -> String {
        raw_url_at(host, self.repo, &self.path(season, format))
    }
}

/// Build a raw-content URL from a repository identifier and a path
///
/// The path is used verbatim; callers include any file extension.
///
/// # Examples
///
/// ```rust
/// use nflverse_fetcher::app::source::raw_url;
///
/// assert_eq!(
///     raw_url("nflverse-data", "data/players.csv"),
///     "https://raw.githubusercontent.com/nflverse/nflverse-data/master/data/players.csv"
/// );
/// ```
pub fn raw_url(repo: &str, path: &str) -> String {
    raw_url_at(github::RAW_HOST, repo, path)
}

/// [`raw_url`] against an arbitrary host (mirrors, local test servers)
pub fn raw_url_at(host: &str, repo: &str, path: &str) -> String {
    let (owner, name) = match repo.split_once('/') {
        Some((owner, name)) => (owner, name),
        None => (github::DEFAULT_OWNER, repo),
    };
    format!(
        "{}/{}/{}/{}/{}",
        host.trim_end_matches('/'),
        owner,
        name,
        github::BRANCH,
        path
    )
}

/// Season-scoped path: `base` when `season <= 0`, otherwise `base_<season>`
pub fn season_path(base: &str, season: i32) -> String {
    if season > 0 {
        format!("{}_{}", base, season)
    } else {
        base.to_string()
    }
}
