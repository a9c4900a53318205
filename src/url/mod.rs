//! URL handling module for Sumi-Sitemap
//!
//! This module provides URL repair, href resolution and same-host filtering.
//! All functions here are pure; none of them touch crawl state.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{extract_host, filter_same_domain};
pub use normalize::{repair_url, UrlParts};
pub use resolve::resolve_href;
