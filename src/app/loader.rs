//! Dataset loading orchestrator
//!
//! Resolves a dataset source to a URL, fetches it, parses the content into rows
//! and maps each row into a typed record. Season-scoped requests that come back
//! not-found fall back to the source's base (all-seasons) file. With format
//! fallback enabled, a failed download is retried once in the other format
//! before that decision is made.

use bytes::Bytes;
use tracing::{debug, info};

use crate::app::client::{FetchOptions, Fetcher};
use crate::app::context::FetchContext;
use crate::app::parse::{self, DataFormat, Row};
use crate::app::select::{current_season, Selection};
use crate::app::source::{raw_url_at, Source};
use crate::config::{AppConfig, ConfigOverrides};
use crate::constants::github;
use crate::errors::{FetchError, FetchResult, LoadError, LoadResult, Result};

/// Records together with where they actually came from
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// Season that was requested (`0` for the base file)
    pub season: i32,
    /// Mapped records in source-file order
    pub records: Vec<T>,
    /// URL the records were loaded from
    pub url: String,
    /// Whether a season-scoped request fell back to the base file
    pub fell_back: bool,
}

/// Fetch, parse and map datasets
#[derive(Debug, Clone)]
pub struct Loader {
    fetcher: Fetcher,
    format: DataFormat,
    format_fallback: bool,
    options: FetchOptions,
    raw_host: String,
    current_season: Option<i32>,
}

impl Loader {
    /// Loader over `fetcher`, requesting CSV from the public raw-content host
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            format: DataFormat::default(),
            format_fallback: false,
            options: FetchOptions::default(),
            raw_host: github::RAW_HOST.to_string(),
            current_season: None,
        }
    }

    /// Set the format requested for sources whose base path has no extension
    pub fn with_format(mut self, format: DataFormat) -> Self {
        self.format = format;
        self
    }

    /// Retry a failed download once in the other format
    ///
    /// Only not-found, HTTP and transport failures are retried; timeouts and
    /// cancellation are not. When both formats fail the first error is kept.
    pub fn with_format_fallback(mut self, enabled: bool) -> Self {
        self.format_fallback = enabled;
        self
    }

    /// Ignore cached validators so every request downloads the full body
    pub fn with_force_refresh(mut self, enabled: bool) -> Self {
        self.options.force_refresh = enabled;
        self
    }

    /// A copy of this loader that bypasses cached validators, sharing the same cache
    pub fn refreshing(&self) -> Self {
        self.clone().with_force_refresh(true)
    }

    /// Point source resolution at another raw-content host
    pub fn with_raw_host(mut self, host: impl Into<String>) -> Self {
        self.raw_host = host.into();
        self
    }

    /// Pin the season that selections treat as current
    pub fn with_current_season(mut self, season: i32) -> Self {
        self.current_season = Some(season);
        self
    }

    /// Build a loader (fetcher, cache, format, host) from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the fetcher or its cache cannot be created
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Fetcher::from_config(config).await?;
        Ok(Self::new(fetcher)
            .with_format(config.prefer)
            .with_format_fallback(config.format_fallback)
            .with_raw_host(config.raw_host.clone()))
    }

    /// Build a loader from defaults, `.env` and `NFLVERSE_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds invalid values or the cache
    /// cannot be created
    pub async fn from_env() -> Result<Self> {
        let config = AppConfig::load(None, &ConfigOverrides::default()).await?;
        Self::from_config(&config).await
    }

    /// The underlying fetcher
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Format requested for extension-less sources
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Season that selections treat as current
    pub fn current_season(&self) -> i32 {
        self.current_season.unwrap_or_else(current_season)
    }

    /// Resolved URL for a source and season
    pub fn resolve(&self, source: &Source, season: i32) -> String {
        source.url_at(&self.raw_host, season, self.format)
    }

    /// Fetch `url` and return its body
    pub async fn load_raw(&self, ctx: &FetchContext, url: &str) -> LoadResult<Bytes> {
        Ok(self.fetch_bytes(ctx, url).await?)
    }

    /// Fetch and parse `url` into generic rows
    pub async fn load_rows(&self, ctx: &FetchContext, url: &str) -> LoadResult<Vec<Row>> {
        let bytes = self.load_raw(ctx, url).await?;
        parse_rows(&bytes, url)
    }

    /// Load an explicit repository path, without season handling
    pub async fn load_path<T, F>(
        &self,
        ctx: &FetchContext,
        repo: &str,
        path: &str,
        mapper: F,
    ) -> LoadResult<Vec<T>>
    where
        F: Fn(&Row) -> T,
    {
        let url = raw_url_at(&self.raw_host, repo, path);
        let rows = self.load_rows(ctx, &url).await?;
        Ok(rows.iter().map(mapper).collect())
    }

    /// Load one season of a dataset, falling back to the base file on not-found
    ///
    /// `season <= 0` requests the base file directly.
    pub async fn load_from_source<T, F>(
        &self,
        ctx: &FetchContext,
        source: &Source,
        season: i32,
        mapper: F,
    ) -> LoadResult<Vec<T>>
    where
        F: Fn(&Row) -> T,
    {
        let loaded = self.load_with_provenance(ctx, source, season, mapper).await?;
        Ok(loaded.records)
    }

    /// [`Loader::load_from_source`], also reporting the URL used and whether it fell back
    ///
    /// Only a not-found on the season URL triggers the fallback. Timeouts,
    /// cancellation, other HTTP statuses and parse failures are returned as is.
    pub async fn load_with_provenance<T, F>(
        &self,
        ctx: &FetchContext,
        source: &Source,
        season: i32,
        mapper: F,
    ) -> LoadResult<Loaded<T>>
    where
        F: Fn(&Row) -> T,
    {
        let loaded = self.load_source_rows(ctx, source, season).await?;
        Ok(Loaded {
            season: loaded.season,
            records: loaded.records.iter().map(mapper).collect(),
            url: loaded.url,
            fell_back: loaded.fell_back,
        })
    }

    /// Generic rows for one season of a dataset, with provenance
    pub async fn load_source_rows(
        &self,
        ctx: &FetchContext,
        source: &Source,
        season: i32,
    ) -> LoadResult<Loaded<Row>> {
        if season > 0 {
            match self.fetch_source(ctx, source, season).await {
                Ok((bytes, url)) => {
                    return Ok(Loaded {
                        season,
                        records: parse_rows(&bytes, &url)?,
                        url,
                        fell_back: false,
                    })
                }
                Err(e) if e.is_not_found() => {
                    info!(
                        "{} not found, falling back to base file",
                        self.resolve(source, season)
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        let (bytes, url) = self.fetch_source(ctx, source, 0).await?;
        Ok(Loaded {
            season,
            records: parse_rows(&bytes, &url)?,
            url,
            fell_back: season > 0,
        })
    }

    /// Load several seasons one after another, in increasing season order
    ///
    /// Seasons are sorted and de-duplicated first. The first failure aborts the
    /// whole load. Records are not filtered: a season that falls back returns
    /// the whole base file.
    pub async fn load_seasons<T, F>(
        &self,
        ctx: &FetchContext,
        source: &Source,
        seasons: &[i32],
        mapper: F,
    ) -> LoadResult<Vec<T>>
    where
        F: Fn(&Row) -> T,
    {
        let mut ordered = seasons.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut records = Vec::new();
        for season in ordered {
            let batch = self.load_from_source(ctx, source, season, &mapper).await?;
            debug!("Season {}: {} records", season, batch.len());
            records.extend(batch);
        }
        Ok(records)
    }

    /// Load the rows picked by `selection`, in increasing season order
    ///
    /// Rows are filtered on their `season` and `week` columns before mapping.
    /// The base file is read at most once, however many seasons fall back to it.
    pub async fn load_selection<T, F>(
        &self,
        ctx: &FetchContext,
        source: &Source,
        selection: &Selection,
        mapper: F,
    ) -> LoadResult<Vec<T>>
    where
        F: Fn(&Row) -> T,
    {
        let batches = self
            .load_selection_with_provenance(ctx, source, selection, mapper)
            .await?;
        Ok(batches.into_iter().flat_map(|batch| batch.records).collect())
    }

    /// [`Loader::load_selection`], one [`Loaded`] per file actually read
    pub async fn load_selection_with_provenance<T, F>(
        &self,
        ctx: &FetchContext,
        source: &Source,
        selection: &Selection,
        mapper: F,
    ) -> LoadResult<Vec<Loaded<T>>>
    where
        F: Fn(&Row) -> T,
    {
        let filter = selection.filter(self.current_season());
        let mut batches = Vec::new();
        let mut base_loaded = false;

        for season in filter.seasons() {
            let loaded = self.load_source_rows(ctx, source, season).await?;
            let from_base = loaded.fell_back || season <= 0;
            if from_base && base_loaded {
                debug!("Season {} already covered by {}", season, loaded.url);
                continue;
            }
            base_loaded |= from_base;

            let records: Vec<T> = loaded
                .records
                .iter()
                .filter(|row| filter.matches_row(row))
                .map(&mapper)
                .collect();
            debug!("Season {}: kept {} of {} rows", season, records.len(), loaded.records.len());
            batches.push(Loaded {
                season,
                records,
                url: loaded.url,
                fell_back: loaded.fell_back,
            });
        }
        Ok(batches)
    }

    async fn fetch_bytes(&self, ctx: &FetchContext, url: &str) -> FetchResult<Bytes> {
        let response = self.fetcher.fetch_with(ctx, url, self.options).await?;
        response.bytes().await
    }

    /// Body and URL for one season of `source`, trying the other format when allowed
    async fn fetch_source(
        &self,
        ctx: &FetchContext,
        source: &Source,
        season: i32,
    ) -> FetchResult<(Bytes, String)> {
        let url = self.resolve(source, season);
        let error = match self.fetch_bytes(ctx, &url).await {
            Ok(bytes) => return Ok((bytes, url)),
            Err(e) => e,
        };

        let alternate = source.url_at(&self.raw_host, season, self.format.alternate());
        if !self.format_fallback || alternate == url || !allows_other_format(&error) {
            return Err(error);
        }

        info!("{} failed ({}), trying {}", url, error, alternate);
        match self.fetch_bytes(ctx, &alternate).await {
            Ok(bytes) => Ok((bytes, alternate)),
            Err(e) if e.is_interrupted() => Err(e),
            Err(e) => {
                debug!("{} failed too: {}", alternate, e);
                Err(error)
            }
        }
    }
}

fn allows_other_format(error: &FetchError) -> bool {
    matches!(
        error,
        FetchError::NotFound { .. }
            | FetchError::Http { .. }
            | FetchError::Request { .. }
            | FetchError::Body { .. }
    )
}

fn parse_rows(bytes: &[u8], url: &str) -> LoadResult<Vec<Row>> {
    let rows = parse::auto(bytes, url).map_err(|e| LoadError::Parse {
        url: url.to_string(),
        source: e,
    })?;
    debug!("Parsed {} rows from {}", rows.len(), url);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::ClientConfig;
    use crate::app::select::SeasonWeeks;
    use crate::errors::{FetchError, ParseError};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SOURCE: Source = Source::new("nflverse/nflverse-data", "data/injuries/injuries");

    async fn loader(server: &MockServer) -> Loader {
        let fetcher = Fetcher::new(&ClientConfig::default(), None).unwrap();
        Loader::new(fetcher).with_raw_host(server.uri())
    }

    fn team(row: &Row) -> String {
        row.upper(&["team"])
    }

    #[tokio::test]
    async fn test_season_hit_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nkc\nbuf\n"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let loaded = loader
            .load_with_provenance(&FetchContext::new(), &SOURCE, 2024, team)
            .await
            .unwrap();

        assert_eq!(loaded.records, vec!["KC", "BUF"]);
        assert!(!loaded.fell_back);
        assert!(loaded.url.ends_with("injuries_2024.csv"));
    }

    #[tokio::test]
    async fn test_not_found_falls_back_to_base() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2030.csv"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nne\n"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let loaded = loader
            .load_with_provenance(&FetchContext::new(), &SOURCE, 2030, team)
            .await
            .unwrap();

        assert_eq!(loaded.records, vec!["NE"]);
        assert!(loaded.fell_back);
        assert!(loaded.url.ends_with("injuries.csv"));
    }

    #[tokio::test]
    async fn test_server_error_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.csv"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nne\n"))
            .expect(0)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let result = loader
            .load_from_source(&FetchContext::new(), &SOURCE, 2024, team)
            .await;

        match result.unwrap_err() {
            LoadError::Fetch(FetchError::Http { status, preview, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(preview, "boom");
            }
            other => panic!("Expected HTTP 500, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("team\nkc\n")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nne\n"))
            .expect(0)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let ctx = FetchContext::with_timeout(Duration::from_millis(200));
        let result = loader.load_from_source(&ctx, &SOURCE, 2024, team).await;

        match result.unwrap_err() {
            LoadError::Fetch(FetchError::Timeout { url }) => {
                assert!(url.ends_with("injuries_2024.csv"))
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_base_request_needs_no_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let result = loader
            .load_with_provenance(&FetchContext::new(), &SOURCE, 0, team)
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_parse_failure_names_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.parquet"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PAR1".to_vec()))
            .mount(&server)
            .await;

        let loader = loader(&server).await.with_format(DataFormat::Parquet);
        let result = loader
            .load_from_source(&FetchContext::new(), &SOURCE, 2024, team)
            .await;

        match result.unwrap_err() {
            LoadError::Parse { url, source } => {
                assert!(url.ends_with("injuries_2024.parquet"));
                assert!(matches!(source, ParseError::ParquetNotImplemented { .. }));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_seasons_sorted_and_deduplicated() {
        let server = MockServer::start().await;
        for season in [2022, 2023] {
            Mock::given(method("GET"))
                .and(path(format!(
                    "/nflverse/nflverse-data/master/data/injuries/injuries_{}.csv",
                    season
                )))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(format!("season\n{}\n{}\n", season, season)),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let loader = loader(&server).await;
        let seasons = loader
            .load_seasons(&FetchContext::new(), &SOURCE, &[2023, 2022, 2023], |row| {
                row.int(&["season"])
            })
            .await
            .unwrap();

        assert_eq!(seasons, vec![2022, 2022, 2023, 2023]);
    }

    #[tokio::test]
    async fn test_load_path_is_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dynastyprocess/data/master/files/db_playerids.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("gsis_id\n00-0033873\n"))
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let ids = loader
            .load_path(
                &FetchContext::new(),
                "dynastyprocess/data",
                "files/db_playerids.csv",
                |row| row.text("gsis_id"),
            )
            .await
            .unwrap();
        assert_eq!(ids, vec!["00-0033873"]);
    }

    #[tokio::test]
    async fn test_format_fallback_tries_other_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.parquet"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2024.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nphi\n"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server)
            .await
            .with_format(DataFormat::Parquet)
            .with_format_fallback(true);
        let loaded = loader
            .load_with_provenance(&FetchContext::new(), &SOURCE, 2024, team)
            .await
            .unwrap();

        assert_eq!(loaded.records, vec!["PHI"]);
        assert!(!loaded.fell_back);
        assert!(loaded.url.ends_with("injuries_2024.csv"));
    }

    #[tokio::test]
    async fn test_format_fallback_keeps_season_fallback() {
        let server = MockServer::start().await;
        for (file, status) in [("injuries_2030.csv", 404), ("injuries_2030.parquet", 500)] {
            Mock::given(method("GET"))
                .and(path(format!("/nflverse/nflverse-data/master/data/injuries/{}", file)))
                .respond_with(ResponseTemplate::new(status))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nne\n"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server).await.with_format_fallback(true);
        let loaded = loader
            .load_with_provenance(&FetchContext::new(), &SOURCE, 2030, team)
            .await
            .unwrap();

        assert_eq!(loaded.records, vec!["NE"]);
        assert!(loaded.fell_back);
        assert!(loaded.url.ends_with("injuries.csv"));
    }

    #[tokio::test]
    async fn test_format_fallback_disabled_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.parquet"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PAR1".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let result = loader
            .load_from_source(&FetchContext::new(), &SOURCE, 0, team)
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_selection_filters_rows_and_reads_base_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2023.csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("season,week,team\n2023,1,kc\n2023,2,buf\n"),
            )
            .expect(1)
            .mount(&server)
            .await;
        for season in [2030, 2031] {
            Mock::given(method("GET"))
                .and(path(format!(
                    "/nflverse/nflverse-data/master/data/injuries/injuries_{}.csv",
                    season
                )))
                .respond_with(ResponseTemplate::new(404))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "season,week,team\n2030,1,ne\n2030,2,nyj\n2031,1,mia\n2029,1,dal\n",
            ))
            .expect(2)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let selection = Selection::SeasonWeeks(vec![
            SeasonWeeks::new(2023, [2]),
            SeasonWeeks::new(2030, [1]),
            SeasonWeeks::all(2031),
        ]);
        let batches = loader
            .load_selection_with_provenance(&FetchContext::new(), &SOURCE, &selection, team)
            .await
            .unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].season, 2023);
        assert_eq!(batches[0].records, vec!["BUF"]);
        assert_eq!(batches[1].season, 2030);
        assert!(batches[1].fell_back);
        assert_eq!(batches[1].records, vec!["NE", "MIA"]);
    }

    #[tokio::test]
    async fn test_empty_selection_loads_current_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries_2026.csv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("season,week,team\n2026,1,det\n2026,2,gb\n"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let loader = loader(&server).await.with_current_season(2026);
        assert_eq!(loader.current_season(), 2026);
        let teams = loader
            .load_selection(&FetchContext::new(), &SOURCE, &Selection::seasons(Vec::new()), team)
            .await
            .unwrap();
        assert_eq!(teams, vec!["DET", "GB"]);

        let week_two = loader
            .load_selection(&FetchContext::new(), &SOURCE, &Selection::Weeks(vec![2]), team)
            .await;
        assert_eq!(week_two.unwrap(), vec!["GB"]);
    }

    #[tokio::test]
    async fn test_selection_all_reads_base_unfiltered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("team\nkc\nsf\n"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = loader(&server).await;
        let batches = loader
            .load_selection_with_provenance(&FetchContext::new(), &SOURCE, &Selection::All, team)
            .await
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].season, 0);
        assert!(!batches[0].fell_back);
        assert_eq!(batches[0].records, vec!["KC", "SF"]);
    }

    #[tokio::test]
    async fn test_refreshing_loader_sends_no_validators() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nflverse/nflverse-data/master/data/injuries/injuries.csv"))
            .and(|request: &wiremock::Request| !request.headers.contains_key("If-None-Match"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"v1\"")
                    .set_body_string("team\nlv\n"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let cache: std::sync::Arc<dyn crate::app::cache::ResponseCache> = std::sync::Arc::new(
            crate::app::cache::MemoryCache::new(Duration::from_secs(3600)),
        );
        let fetcher = Fetcher::new(&ClientConfig::default(), Some(cache)).unwrap();
        let loader = Loader::new(fetcher).with_raw_host(server.uri());
        let ctx = FetchContext::new();

        let first = loader.load_from_source(&ctx, &SOURCE, 0, team).await.unwrap();
        let again = loader
            .refreshing()
            .load_from_source(&ctx, &SOURCE, 0, team)
            .await
            .unwrap();
        assert_eq!(first, again);
    }
}
