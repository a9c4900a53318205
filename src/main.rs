//! Sumi-Sitemap main entry point
//!
//! This is the command-line interface for the Sumi-Sitemap single-domain
//! site mapper.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_sitemap::config::{load_config_or_default, Config};
use sumi_sitemap::crawler::{CrawlEngine, CrawlOptions, HtmlParser, ReqwestTransport};
use sumi_sitemap::output::{print_statistics, write_site_map, write_statistics, OutputFormat};
use sumi_sitemap::CrawlError;
use tracing_subscriber::EnvFilter;

/// Sumi-Sitemap: maps the links of a single website
///
/// Sumi-Sitemap crawls every page reachable from the starting URL without
/// leaving its host, then prints each crawled page with the links it holds.
#[derive(Parser, Debug)]
#[command(name = "sumi-sitemap")]
#[command(version = "1.0.0")]
#[command(about = "A single-domain site mapper", long_about = None)]
struct Cli {
    /// URL to start crawling from; the scheme defaults to https
    #[arg(value_name = "STARTING_URL")]
    starting_url: String,

    /// Stop dispatching new pages after this many (unlimited when unset or 0)
    #[arg(long = "max_page_limit", value_name = "N")]
    max_page_limit: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// How to print the site map
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print crawl statistics after the site map
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load_config_or_default(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    apply_cli_overrides(&cli, &mut config);

    handle_crawl(&cli, &config).await
}

/// Applies command-line settings on top of the loaded configuration
fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if let Some(limit) = cli.max_page_limit {
        config.crawler.max_page_limit = Some(limit);
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the site map on stdout stays machine-readable.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sitemap=info,warn"),
            1 => EnvFilter::new("sumi_sitemap=debug,info"),
            2 => EnvFilter::new("sumi_sitemap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves once Ctrl-C is received; never resolves if the handler can't be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(ReqwestTransport::new()?);
    let engine = CrawlEngine::new(
        &cli.starting_url,
        transport,
        HtmlParser,
        CrawlOptions::from_config(config),
    )?;

    match engine.crawl_until(shutdown_signal()).await {
        Ok(stats) => {
            let site_data = engine.site_data()?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_site_map(&mut handle, &site_data, cli.format)?;
            handle.flush()?;
            drop(handle);

            if cli.stats {
                // Keep stdout a single JSON document
                match cli.format {
                    OutputFormat::Text => print_statistics(&stats)?,
                    OutputFormat::Json => write_statistics(&mut std::io::stderr(), &stats)?,
                }
            }
            Ok(())
        }
        Err(CrawlError::Cancelled) => {
            tracing::warn!("Web crawler interrupted by user");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
