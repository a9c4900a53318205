//! Configuration module for Sumi-Sitemap
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The file is optional; every setting has a default.
//!
//! # Example
//!
//! ```no_run
//! use sumi_sitemap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap.toml")).unwrap();
//! println!("Each page is tried up to {} times", config.crawler.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig, DEFAULT_USER_AGENTS};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

// Re-export validation
pub use validation::validate;
