//! Page fetching with retry
//!
//! This module handles a single page request for the crawler:
//! - Picking a user agent from the configured pool
//! - Retrying transient transport failures with exponential backoff
//! - Wrapping the response as a [`ParsedPage`] whose links can be queried

use super::parser::DocumentParser;
use super::transport::Transport;
use crate::config::{Config, DEFAULT_USER_AGENTS};
use crate::url::{filter_same_domain, repair_url, resolve_href};
use crate::FetchError;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

/// How a single page is requested
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    /// Total attempts per page, including the first
    pub max_attempts: u32,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Exponential backoff base
    pub backoff_base: u32,
    /// Backoff unit; the wait after attempt `n` (0-based) is `unit * base^n`
    pub backoff_unit: Duration,
    /// User-agent strings to choose from
    pub user_agents: Vec<String>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(10),
            backoff_base: 2,
            backoff_unit: Duration::from_secs(1),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

impl FetchPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.crawler.max_attempts,
            timeout: Duration::from_secs(config.crawler.request_timeout),
            backoff_base: config.crawler.backoff_base,
            backoff_unit: Duration::from_millis(config.crawler.backoff_unit_ms),
            user_agents: config.user_agent.pool.clone(),
        }
    }

    /// Wait after the failed attempt with 0-based index `attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(self.backoff_base.saturating_pow(attempt))
    }

    /// Picks one user agent uniformly at random, or `None` if the pool is empty
    pub fn pick_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.user_agents.len());
        self.user_agents.get(index).map(String::as_str)
    }
}

/// A fetched page and its parsed document
///
/// `document` is present only when the server answered 200.
#[derive(Debug)]
pub struct ParsedPage<D> {
    url: String,
    status: u16,
    document: Option<D>,
}

impl<D> ParsedPage<D> {
    /// Wraps a response; `page_url` is repaired before it is stored
    pub fn new(page_url: &str, status: u16, document: Option<D>) -> Self {
        Self {
            url: repair_url(page_url),
            status,
            document,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    /// True when the page answered 200 and was parsed
    pub fn is_available(&self) -> bool {
        self.status == 200 && self.document.is_some()
    }

    /// Every anchor href on the page, resolved against the page URL
    ///
    /// Hrefs that cannot be resolved are skipped. An unavailable page has no
    /// links.
    pub fn links<P>(&self, parser: &P) -> HashSet<String>
    where
        P: DocumentParser<Document = D> + ?Sized,
    {
        let Some(document) = &self.document else {
            return HashSet::new();
        };

        parser
            .select_anchors(document)
            .iter()
            .filter_map(|href| match resolve_href(&self.url, href) {
                Ok(absolute) => Some(absolute),
                Err(e) => {
                    tracing::debug!("Skipping href {:?} on {}: {}", href, self.url, e);
                    None
                }
            })
            .collect()
    }

    /// The subset of `links` on the same host as this page
    pub fn same_domain_links(&self, links: &HashSet<String>) -> HashSet<String> {
        filter_same_domain(&self.url, links)
    }
}

/// Fetches one page, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Parse body, return page |
/// | Any other status | Return unavailable page, no retry |
/// | Invalid URL | Fail immediately |
/// | Any other transport error | Retry after `unit * base^attempt` |
///
/// One user agent is chosen per call and sent on every attempt. The document
/// is parsed after the last await, so it never lives across a suspension
/// point.
pub async fn fetch_page<T, P>(
    transport: &T,
    parser: &P,
    url: &str,
    policy: &FetchPolicy,
) -> Result<ParsedPage<P::Document>, FetchError>
where
    T: Transport + ?Sized,
    P: DocumentParser + ?Sized,
{
    let headers: Vec<(&str, &str)> = policy
        .pick_user_agent()
        .map(|ua| vec![("User-Agent", ua)])
        .unwrap_or_default();
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match transport.get(url, &headers, policy.timeout).await {
            Ok(response) if response.status == 200 => {
                let document = parser.parse(&response.body);
                return Ok(ParsedPage::new(url, response.status, Some(document)));
            }
            Ok(response) => {
                tracing::warn!("{} is unavailable (HTTP {})", url, response.status);
                return Ok(ParsedPage::new(url, response.status, None));
            }
            Err(error) if !error.is_retryable() => {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: error.to_string(),
                });
            }
            Err(error) if attempt + 1 < attempts => {
                let delay = policy.backoff_delay(attempt);
                tracing::debug!(
                    "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    attempts,
                    url,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::error!(
                    "Failed to fetch {} after {} attempts: {}",
                    url,
                    attempts,
                    error
                );
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts,
                    source: error,
                });
            }
        }
    }
}
