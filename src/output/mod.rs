//! Output module for presenting crawl results
//!
//! This module handles:
//! - Rendering the site map as text or JSON
//! - Recording and printing crawl statistics

mod sitemap;
pub mod stats;

pub use sitemap::{format_json_site_map, format_text_site_map, write_site_map, OutputFormat};
pub use stats::{print_statistics, write_statistics, CrawlStatistics};
