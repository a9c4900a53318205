//! Crawl coordinator
//!
//! [`CrawlEngine`] owns the frontier and drives the crawl:
//! - Seeding the frontier with the repaired root URL
//! - Dispatching one unit of work per queued URL onto a `JoinSet`
//! - Folding each finished page back into the frontier
//! - Stopping at the page limit, on an unexpected error, or on shutdown

use super::fetcher::{fetch_page, FetchPolicy, ParsedPage};
use super::parser::DocumentParser;
use super::transport::Transport;
use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::state::{CrawlState, PageOutcome, SiteData};
use crate::url::{extract_host, repair_url};
use crate::{CrawlError, UrlError};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Engine settings that are not about a single request
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOptions {
    /// Stop dispatching after this many pages; `None` crawls until exhausted
    pub page_limit: Option<u64>,
    /// Most pages fetched at once
    pub max_concurrency: usize,
    /// How each page is requested
    pub fetch: FetchPolicy,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_limit: None,
            max_concurrency: 50,
            fetch: FetchPolicy::default(),
        }
    }
}

impl CrawlOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_limit: config.crawler.page_limit(),
            max_concurrency: config.crawler.max_concurrency,
            fetch: FetchPolicy::from_config(config),
        }
    }
}

/// Everything a unit of work needs, shared behind one `Arc`
struct Shared<T: ?Sized, P> {
    transport: Arc<T>,
    parser: P,
    policy: FetchPolicy,
    state: Mutex<CrawlState>,
    limiter: Semaphore,
}

impl<T: ?Sized, P> Shared<T, P> {
    fn lock_state(&self) -> Result<MutexGuard<'_, CrawlState>, CrawlError> {
        self.state
            .lock()
            .map_err(|_| CrawlError::Unexpected("crawl state lock poisoned".to_string()))
    }
}

/// Single-domain crawl engine
///
/// The frontier lives behind a `std::sync::Mutex` that is only ever held for
/// one synchronous transition, never across an await.
pub struct CrawlEngine<T: ?Sized, P> {
    root_url: String,
    page_limit: Option<u64>,
    shared: Arc<Shared<T, P>>,
}

impl<T, P> CrawlEngine<T, P>
where
    T: Transport + ?Sized + 'static,
    P: DocumentParser + 'static,
{
    /// Creates an engine whose frontier holds only the repaired root URL
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to crawl
    /// * `Err(CrawlError::Url)` - The root has no host even after repair
    pub fn new(
        root_url: &str,
        transport: Arc<T>,
        parser: P,
        options: CrawlOptions,
    ) -> Result<Self, CrawlError> {
        let root_url = repair_url(root_url);
        if extract_host(&root_url).is_empty() {
            return Err(UrlError::MissingHost(root_url).into());
        }

        let shared = Shared {
            transport,
            parser,
            policy: options.fetch,
            state: Mutex::new(CrawlState::with_root(root_url.clone())),
            limiter: Semaphore::new(options.max_concurrency.max(1)),
        };

        Ok(Self {
            root_url,
            page_limit: options.page_limit,
            shared: Arc::new(shared),
        })
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn page_limit(&self) -> Option<u64> {
        self.page_limit
    }

    /// Queues every URL that has not been seen yet
    pub fn update_to_visit<I>(&self, urls: I) -> Result<usize, CrawlError>
    where
        I: IntoIterator<Item = String>,
    {
        Ok(self.shared.lock_state()?.update_to_visit(urls))
    }

    /// Copy of the site graph collected so far
    pub fn site_data(&self) -> Result<SiteData, CrawlError> {
        Ok(self.shared.lock_state()?.site_data().clone())
    }

    /// Copy of the whole frontier
    pub fn state_snapshot(&self) -> Result<CrawlState, CrawlError> {
        Ok(self.shared.lock_state()?.clone())
    }

    /// Crawls until the frontier is exhausted or the page limit is reached
    pub async fn crawl(&self) -> Result<CrawlStatistics, CrawlError> {
        self.crawl_until(std::future::pending()).await
    }

    /// Crawls like [`CrawlEngine::crawl`], stopping early when `shutdown` resolves
    ///
    /// On shutdown every in-flight unit of work is aborted and awaited before
    /// this returns `Err(CrawlError::Cancelled)`. An unexpected failure in any
    /// unit stops further dispatch; the rest are drained and the first such
    /// error is returned.
    pub async fn crawl_until<F>(&self, shutdown: F) -> Result<CrawlStatistics, CrawlError>
    where
        F: Future<Output = ()>,
    {
        if self.page_limit.is_none() {
            tracing::warn!(
                "No max_page_limit set; crawling {} until every same-domain page is visited",
                self.root_url
            );
        }

        tracing::info!("Starting crawl of {}", self.root_url);
        let started_at = Utc::now();
        let mut tasks = JoinSet::new();
        let mut dispatched = 0u64;

        let outcome = tokio::select! {
            outcome = self.drive(&mut tasks, &mut dispatched) => outcome,
            () = shutdown => Err(CrawlError::Cancelled),
        };

        if matches!(outcome, Err(CrawlError::Cancelled)) {
            tracing::warn!("Crawl cancelled, aborting {} in-flight pages", tasks.len());
            tasks.abort_all();
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Unit of work panicked during shutdown: {}", e);
                }
            }
        }

        let stats = self.statistics(dispatched, started_at);
        if let Ok(stats) = &stats {
            tracing::info!(
                "{} pages crawled ({} unavailable, {} failed)",
                stats.pages_parsed,
                stats.pages_unavailable,
                stats.pages_failed
            );
        }

        outcome?;
        stats
    }

    /// Dispatch loop: start work while allowed, otherwise wait for one unit
    async fn drive(
        &self,
        tasks: &mut JoinSet<Result<(), CrawlError>>,
        dispatched: &mut u64,
    ) -> Result<(), CrawlError> {
        let mut failure: Option<CrawlError> = None;

        loop {
            let under_limit = self.page_limit.map_or(true, |limit| *dispatched < limit);
            let next = if failure.is_none() && under_limit {
                match self.shared.lock_state() {
                    Ok(mut state) => state.dispatch_next(),
                    Err(e) => {
                        failure = Some(e);
                        None
                    }
                }
            } else {
                None
            };

            if let Some(url) = next {
                tasks.spawn(process_page(Arc::clone(&self.shared), url));
                *dispatched += 1;
                continue;
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let result = joined
                .map_err(|e| CrawlError::Unexpected(format!("unit of work failed: {}", e)))
                .and_then(|result| result);
            if let Err(e) = result {
                tracing::error!("Unexpected error during crawl: {}", e);
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn statistics(
        &self,
        dispatched: u64,
        started_at: DateTime<Utc>,
    ) -> Result<CrawlStatistics, CrawlError> {
        let state = self.shared.lock_state()?;
        Ok(CrawlStatistics {
            root_url: self.root_url.clone(),
            pages_dispatched: dispatched,
            pages_parsed: state.pages_parsed(),
            pages_unavailable: state.pages_unavailable(),
            pages_failed: state.pages_failed(),
            total_links: state.site_data().values().map(|links| links.len() as u64).sum(),
            urls_seen: state.seen().len() as u64,
            urls_remaining: state.to_visit().len() as u64,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

/// One unit of work: fetch a page, then fold the result into the frontier
async fn process_page<T, P>(shared: Arc<Shared<T, P>>, url: String) -> Result<(), CrawlError>
where
    T: Transport + ?Sized,
    P: DocumentParser,
{
    let _permit = shared
        .limiter
        .acquire()
        .await
        .map_err(|e| CrawlError::Unexpected(e.to_string()))?;

    tracing::info!("Begin processing: {}", url);
    let outcome = match fetch_page(shared.transport.as_ref(), &shared.parser, &url, &shared.policy).await
    {
        Ok(page) => page_outcome(&page, &shared.parser),
        Err(e) => {
            tracing::warn!("Giving up on {}: {}", url, e);
            PageOutcome::Failed
        }
    };

    let queued = shared.lock_state()?.finish(&url, outcome)?;
    tracing::debug!("{} new URLs queued from {}", queued, url);
    tracing::info!("End processing: {}", url);
    Ok(())
}

fn page_outcome<P>(page: &ParsedPage<P::Document>, parser: &P) -> PageOutcome
where
    P: DocumentParser,
{
    if !page.is_available() {
        return PageOutcome::Unavailable {
            status: page.status(),
        };
    }

    tracing::debug!("Retrieving links from: {}", page.url());
    let links = page.links(parser);
    let same_domain = page.same_domain_links(&links);
    PageOutcome::Parsed { links, same_domain }
}
