//! Crawl frontier and site graph
//!
//! `CrawlState` owns every set the crawl engine mutates. Each method is one
//! complete transition, so a caller holding the state behind a single lock
//! gets atomic check-and-update for free.

use crate::state::PageState;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Crawled page URL → every absolute link found on it
pub type SiteData = HashMap<String, HashSet<String>>;

/// Errors raised when the frontier is asked to do something inconsistent
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Invalid state transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: PageState,
        to: PageState,
    },
}

/// What a finished unit of work produced for its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was fetched and parsed
    Parsed {
        /// Every absolute link found on the page
        links: HashSet<String>,
        /// The subset of `links` on the page's own host
        same_domain: HashSet<String>,
    },

    /// The server answered with a non-200 status
    Unavailable { status: u16 },

    /// The page could not be fetched (retries exhausted or invalid URL)
    Failed,
}

/// The crawl frontier plus the site graph collected so far
///
/// # Invariants
///
/// - `to_visit ∩ visiting = ∅`
/// - `visiting ∪ to_visit ⊆ seen`
/// - `seen` only grows, and a URL in `seen` is never queued again
/// - `site_data` gets at most one entry per URL
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    seen: HashSet<String>,
    visiting: HashSet<String>,
    // Unordered; dispatch picks any member
    to_visit: HashSet<String>,
    site_data: SiteData,

    pages_parsed: u64,
    pages_unavailable: u64,
    pages_failed: u64,
}

impl CrawlState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state seeded with the root URL
    pub fn with_root(root_url: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.enqueue(root_url.into());
        state
    }

    /// Moves a URL from `Unseen` to `Queued`
    ///
    /// Returns false (and changes nothing) if the URL was already seen.
    pub fn enqueue(&mut self, url: String) -> bool {
        if !self.state_of(&url).can_transition_to(PageState::Queued) {
            return false;
        }

        tracing::debug!("Adding URL to queue: {}", url);
        self.seen.insert(url.clone());
        self.to_visit.insert(url);
        true
    }

    /// Queues every URL that has not been seen yet
    ///
    /// This and [`CrawlState::with_root`] are the only ways into the frontier.
    ///
    /// # Returns
    ///
    /// The number of URLs that were newly queued
    pub fn update_to_visit<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .filter(|url| self.enqueue(url.clone()))
            .count()
    }

    /// Moves an arbitrary queued URL to `InFlight`
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The URL that is now in flight
    /// * `None` - Nothing is queued
    pub fn dispatch_next(&mut self) -> Option<String> {
        let url = self.to_visit.iter().next()?.clone();
        self.to_visit.remove(&url);
        self.visiting.insert(url.clone());
        Some(url)
    }

    /// Moves an in-flight URL to `Done`, folding in what its unit of work found
    ///
    /// For a parsed page this records the full link set in `site_data` and
    /// queues every unseen same-domain link.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of URLs newly queued
    /// * `Err(FrontierError)` - The URL was not in flight
    pub fn finish(&mut self, url: &str, outcome: PageOutcome) -> Result<usize, FrontierError> {
        let from = self.state_of(url);
        if !from.can_transition_to(PageState::Done) {
            return Err(FrontierError::InvalidTransition {
                url: url.to_string(),
                from,
                to: PageState::Done,
            });
        }

        let queued = match outcome {
            PageOutcome::Parsed { links, same_domain } => {
                self.pages_parsed += 1;
                self.site_data.entry(url.to_string()).or_insert(links);
                self.update_to_visit(same_domain)
            }
            PageOutcome::Unavailable { .. } => {
                self.pages_unavailable += 1;
                0
            }
            PageOutcome::Failed => {
                self.pages_failed += 1;
                0
            }
        };

        self.visiting.remove(url);
        Ok(queued)
    }

    /// Returns the lifecycle state of a URL
    pub fn state_of(&self, url: &str) -> PageState {
        if self.to_visit.contains(url) {
            PageState::Queued
        } else if self.visiting.contains(url) {
            PageState::InFlight
        } else if self.seen.contains(url) {
            PageState::Done
        } else {
            PageState::Unseen
        }
    }

    /// Returns true when nothing is queued and nothing is in flight
    pub fn is_exhausted(&self) -> bool {
        self.to_visit.is_empty() && self.visiting.is_empty()
    }

    /// Checks the frontier invariants
    pub fn is_consistent(&self) -> bool {
        self.to_visit.is_disjoint(&self.visiting)
            && self.to_visit.is_subset(&self.seen)
            && self.visiting.is_subset(&self.seen)
    }

    /// URLs ever accepted into the frontier
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    /// URLs currently in flight
    pub fn visiting(&self) -> &HashSet<String> {
        &self.visiting
    }

    /// URLs queued but not yet dispatched
    pub fn to_visit(&self) -> &HashSet<String> {
        &self.to_visit
    }

    /// Crawled page URL → every link found on it
    pub fn site_data(&self) -> &SiteData {
        &self.site_data
    }

    pub fn pages_parsed(&self) -> u64 {
        self.pages_parsed
    }

    pub fn pages_unavailable(&self) -> u64 {
        self.pages_unavailable
    }

    pub fn pages_failed(&self) -> u64 {
        self.pages_failed
    }
}
