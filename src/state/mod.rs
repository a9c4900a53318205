//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: The lifecycle of a single URL (unseen, queued, in flight, done)
//! - `CrawlState`: The frontier (`seen`, `visiting`, `to_visit`) and the site graph
//! - `PageOutcome`: What a finished unit of work hands back to the frontier

mod frontier;
mod page_state;

// Re-export main types
pub use frontier::{CrawlState, FrontierError, PageOutcome, SiteData};
pub use page_state::PageState;
