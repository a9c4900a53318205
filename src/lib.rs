//! Sumi-Sitemap: a single-domain site mapper
//!
//! This crate crawls one website starting from a root URL, follows links that
//! stay on the root's host, and records which links every crawled page
//! contains.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sitemap operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Frontier error: {0}")]
    Frontier(#[from] state::FrontierError),

    #[error("Unexpected error during crawl: {0}")]
    Unexpected(String),

    #[error("Crawl cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Failures reported by a [`crawler::Transport`]
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns true if another attempt could succeed
    ///
    /// A malformed URL fails the same way every time; everything else
    /// (refused connections, resets, DNS hiccups, timeouts) is transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}

/// A page that could not be fetched at all
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Failed to fetch {url} after {attempts} attempts: {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        source: TransportError,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlOptions};
pub use state::{CrawlState, PageState};
pub use crate::url::{filter_same_domain, repair_url, resolve_href};
