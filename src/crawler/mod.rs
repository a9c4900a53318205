//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The HTTP transport and HTML parser capabilities
//! - Page fetching with retry and backoff
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{CrawlEngine, CrawlOptions};
pub use fetcher::{fetch_page, FetchPolicy, ParsedPage};
pub use parser::{DocumentParser, HtmlParser};
pub use transport::{build_http_client, ReqwestTransport, Transport, TransportResponse};

use crate::config::{validate, Config};
use crate::output::CrawlStatistics;
use crate::state::SiteData;
use crate::CrawlError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the simplest entry point: it builds a reqwest-backed transport
/// and the scraper-backed parser, crawls from `starting_url` with the given
/// configuration, and returns the statistics along with the site graph.
///
/// # Arguments
///
/// * `starting_url` - Root URL; a missing scheme defaults to https
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok((CrawlStatistics, SiteData))` - Crawl completed
/// * `Err(CrawlError)` - The configuration is invalid or the crawl failed
pub async fn crawl(
    starting_url: &str,
    config: &Config,
) -> Result<(CrawlStatistics, SiteData), CrawlError> {
    validate(config)?;
    let transport = Arc::new(ReqwestTransport::new()?);
    let engine = CrawlEngine::new(
        starting_url,
        transport,
        HtmlParser,
        CrawlOptions::from_config(config),
    )?;

    let stats = engine.crawl().await?;
    let site_data = engine.site_data()?;
    Ok((stats, site_data))
}
