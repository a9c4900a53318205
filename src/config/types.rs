use serde::Deserialize;

/// Main configuration structure for Sumi-Sitemap
///
/// Every field has a default, so an empty file (or no file at all) is a
/// valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum fetch attempts per page, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout for a single request (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Backoff after failed attempt `n` is `backoff-base^n` units
    #[serde(rename = "backoff-base")]
    pub backoff_base: u32,

    /// Length of one backoff unit (milliseconds)
    #[serde(rename = "backoff-unit-ms")]
    pub backoff_unit_ms: u64,

    /// Maximum number of fetches running at the same time
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of pages to dispatch; unset or 0 means unlimited
    #[serde(rename = "max-page-limit")]
    pub max_page_limit: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            request_timeout: 10,
            backoff_base: 2,
            backoff_unit_ms: 1000,
            max_concurrency: 50,
            max_page_limit: None,
        }
    }
}

impl CrawlerConfig {
    /// Returns the effective page limit, with 0 read as unlimited
    pub fn page_limit(&self) -> Option<u64> {
        self.max_page_limit.filter(|&limit| limit > 0)
    }
}

/// User agent rotation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// User-Agent strings; each fetch picks one uniformly at random
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// Browser User-Agent strings used when the configuration names none
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/93.0.4577.82 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_4_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Mobile/15E148 Safari/604.1",
    "Mozilla/4.0 (compatible; MSIE 9.0; Windows NT 6.1)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.141 Safari/537.36 Edg/87.0.664.75",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.102 Safari/537.36 Edge/18.18363",
];
