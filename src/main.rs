//! nflverse fetcher CLI application
//!
//! Command-line interface for fetching nflverse NFL datasets.
//! Loads records as JSON lines, resolves dataset URLs and maintains the response cache.

use std::process;

use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use nflverse_fetcher::cli::{handle_cache, handle_load, handle_raw, handle_url, Cli, Commands};
use nflverse_fetcher::config::AppConfig;
use nflverse_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists (RUST_LOG included)
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let overrides = cli.global.to_overrides()?;
    let config = AppConfig::load(cli.global.config.as_deref(), &overrides).await?;

    init_logging(&cli, config.verbose);

    info!("nflverse fetcher v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("Cache backend: {}", config.cache.mode);

    match cli.command {
        Commands::Load(args) => {
            info!("Executing load command");
            handle_load(&config, args).await
        }
        Commands::Url(args) => handle_url(&config, args).await,
        Commands::Raw(args) => {
            info!("Executing raw command");
            handle_raw(&config, args).await
        }
        Commands::Cache(args) => {
            info!("Executing cache command");
            handle_cache(&config, args).await
        }
    }
}

/// Initialize logging from CLI flags and the configured verbosity
fn init_logging(cli: &Cli, verbose: bool) {
    let log_level = if verbose && !cli.global.quiet {
        tracing::Level::DEBUG
    } else {
        cli.log_level()
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("nflverse_fetcher={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_level(log_level == tracing::Level::DEBUG)
        .init();

    debug!("Logging at {} level", log_level);
}
