//! Command handlers for the CLI
//!
//! Each handler receives the fully resolved [`AppConfig`] and its parsed
//! arguments. Record output goes to stdout as JSON lines; progress and
//! provenance go to stderr so the output stays pipeable.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::cache::{FsCache, ResponseCache};
use crate::app::client::{FetchOptions, Fetcher};
use crate::app::context::FetchContext;
use crate::app::loader::Loader;
use crate::app::parse::Row;
use crate::app::select::Selection;
use crate::cli::args::{CacheAction, CacheArgs, LoadArgs, RawArgs, UrlArgs};
use crate::config::AppConfig;
use crate::datasets::{DatasetKey, Injury, Player, SnapCount, TeamStat};
use crate::errors::Result;

/// Handle the load command
pub async fn handle_load(config: &AppConfig, args: LoadArgs) -> Result<()> {
    let key: DatasetKey = args.dataset.parse()?;
    let loader = Loader::from_config(config)
        .await?
        .with_force_refresh(args.refresh);
    let ctx = interruptible_context();

    let selection = args.selection();
    let seasons = selection.filter(loader.current_season()).seasons();
    info!("Loading {} for seasons {:?}", key, seasons);
    let start = Instant::now();

    let plan = LoadPlan {
        loader: &loader,
        ctx: &ctx,
        key,
        selection: &selection,
        season_count: seasons.len(),
        provenance: args.provenance,
    };
    let written = match key {
        DatasetKey::SnapCounts => print_records(&plan.run(SnapCount::from_row).await?, args.limit)?,
        DatasetKey::Players => print_records(&plan.run(Player::from_row).await?, args.limit)?,
        DatasetKey::TeamStatsWeekly => {
            print_records(&plan.run(TeamStat::from_row).await?, args.limit)?
        }
        DatasetKey::Injuries => print_records(&plan.run(Injury::from_row).await?, args.limit)?,
        _ => print_records(&plan.run(Row::clone).await?, args.limit)?,
    };

    info!("Wrote {} {} records in {:?}", written, key, start.elapsed());
    Ok(())
}

/// Handle the url command
pub async fn handle_url(config: &AppConfig, args: UrlArgs) -> Result<()> {
    let key: DatasetKey = args.dataset.parse()?;
    let url = key
        .source()
        .url_at(&config.raw_host, args.season, config.prefer);
    println!("{}", url);
    Ok(())
}

/// Handle the raw command
pub async fn handle_raw(config: &AppConfig, args: RawArgs) -> Result<()> {
    let fetcher = Fetcher::from_config(config).await?;
    let ctx = interruptible_context();

    let options = FetchOptions {
        force_refresh: args.refresh,
    };
    let response = fetcher.fetch_with(&ctx, &args.url, options).await?;
    let metadata = response.metadata().clone();
    let from_cache = response.from_cache();
    let url = response.url().to_string();
    let body = response.bytes().await?;

    eprintln!("URL: {}", url);
    eprintln!("From cache: {}", if from_cache { "yes" } else { "no" });
    eprintln!("ETag: {}", metadata.etag.as_deref().unwrap_or("-"));
    eprintln!(
        "Last-Modified: {}",
        metadata
            .last_modified
            .map(|t| t.to_rfc2822())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(length) = metadata.content_length {
        eprintln!("Content-Length: {}", length);
    }
    eprintln!("Bytes read: {}", body.len());

    if let Some(path) = &args.output {
        tokio::fs::write(path, &body).await?;
        eprintln!("Saved to {}", path.display());
    }
    Ok(())
}

/// Handle cache maintenance
///
/// Always works on the on-disk cache directory; the memory backend lives
/// only as long as a single command.
pub async fn handle_cache(config: &AppConfig, args: CacheArgs) -> Result<()> {
    let root = config.cache.resolved_root()?;
    let cache = FsCache::new(root, config.cache.ttl).await?;

    match args.action {
        CacheAction::Info => {
            let stats = cache.stats().await;
            println!("Cache Information");
            println!("=================");
            println!("Location: {}", stats.cache_root.display());
            println!("Configured backend: {}", config.cache.mode);
            println!("TTL: {}s", config.cache.ttl.as_secs());
            println!(
                "Entries: {} ({} expired)",
                stats.entries, stats.expired_entries
            );
            println!("Size: {}", stats.format_size());
        }
        CacheAction::Clear => {
            cache.clear().await?;
            println!("Cleared cache at {}", cache.root().display());
        }
        CacheAction::Cleanup => {
            let removed = cache.cleanup().await?;
            println!("Removed {} expired entries", removed);
        }
    }
    Ok(())
}

/// What to load and how to report it
struct LoadPlan<'a> {
    loader: &'a Loader,
    ctx: &'a FetchContext,
    key: DatasetKey,
    selection: &'a Selection,
    season_count: usize,
    provenance: bool,
}

impl LoadPlan<'_> {
    /// Load the selection with `mapper`, concatenating the records in season order
    async fn run<T>(&self, mapper: fn(&Row) -> T) -> Result<Vec<T>> {
        let source = self.key.source();
        let spinner = season_spinner(self.season_count);
        spinner.set_message(format!("Loading {}...", self.key));

        let batches = self
            .loader
            .load_selection_with_provenance(self.ctx, &source, self.selection, mapper)
            .await;
        spinner.finish_and_clear();

        let mut records = Vec::new();
        for loaded in batches? {
            if loaded.fell_back {
                warn!(
                    "No {} file for season {}; used {}",
                    self.key, loaded.season, loaded.url
                );
            }
            if self.provenance {
                eprintln!(
                    "season {}: {} records from {}{}",
                    loaded.season,
                    loaded.records.len(),
                    loaded.url,
                    if loaded.fell_back { " (fallback)" } else { "" }
                );
            }
            records.extend(loaded.records);
        }
        Ok(records)
    }
}

/// Spinner for multi-season loads; hidden for a single request
fn season_spinner(seasons: usize) -> ProgressBar {
    if seasons < 2 {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Context cancelled by Ctrl-C
fn interruptible_context() -> FetchContext {
    let ctx = FetchContext::new();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cancelling...");
            token.cancel();
        }
    });
    ctx
}

fn print_records<T: Serialize>(records: &[T], limit: Option<usize>) -> Result<usize> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = write_json_lines(&mut out, records, limit)?;
    out.flush()?;
    Ok(written)
}

/// Write at most `limit` records as one JSON object per line
///
/// Returns the number of records written.
pub fn write_json_lines<T, W>(out: &mut W, records: &[T], limit: Option<usize>) -> Result<usize>
where
    T: Serialize,
    W: Write,
{
    let take = limit.unwrap_or(records.len()).min(records.len());
    for record in &records[..take] {
        serde_json::to_writer(&mut *out, record).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
    }
    Ok(take)
}
