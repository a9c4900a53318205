//! Scripted fakes shared by the crawler unit tests

use super::parser::{DocumentParser, HtmlParser};
use super::transport::{Transport, TransportResponse};
use crate::TransportError;
use async_trait::async_trait;
use scraper::Html;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the fake transport does for one request
pub(crate) enum Reply {
    Page(u16, String),
    Fail(TransportError),
    /// Waits this long, then answers 200 with the body
    Slow(Duration, String),
    /// Never answers
    Hang,
}

/// A request the fake transport received
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

type Responder = Box<dyn Fn(&str, usize) -> Reply + Send + Sync>;

/// Transport answering from a closure of `(url, attempt_for_this_url)`
pub(crate) struct ScriptedTransport {
    responder: Responder,
    calls: Mutex<Vec<Call>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responder: impl Fn(&str, usize) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Serves the listed pages with 200 and everything else with 404
    pub fn from_pages(pages: &[(&str, &str)]) -> Self {
        let pages: Vec<(String, String)> = pages
            .iter()
            .map(|(url, body)| (url.to_string(), body.to_string()))
            .collect();
        Self::new(move |url, _| {
            match pages.iter().find(|(page, _)| page == url) {
                Some((_, body)) => Reply::Page(200, body.clone()),
                None => Reply::Page(404, String::new()),
            }
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.url == url)
            .count()
    }

    /// Requests currently inside `get`
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Most requests that were ever inside `get` at once
    pub fn peak_active(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            let attempt = calls.iter().filter(|call| call.url == url).count();
            calls.push(Call {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            });
            attempt
        };

        let _guard = ActiveGuard::enter(&self.active, &self.peak);
        match (self.responder)(url, attempt) {
            Reply::Page(status, body) => Ok(TransportResponse { status, body }),
            Reply::Fail(error) => Err(error),
            Reply::Slow(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(TransportResponse { status: 200, body })
            }
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Builds an HTML page whose body is one anchor per href
pub(crate) fn page_with_links(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>", href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

/// HTML parser that panics on any body containing `KABOOM`
pub(crate) struct PanickingParser;

impl DocumentParser for PanickingParser {
    type Document = Html;

    fn parse(&self, raw: &str) -> Html {
        if raw.contains("KABOOM") {
            panic!("parser blew up");
        }
        HtmlParser.parse(raw)
    }

    fn select_anchors(&self, document: &Html) -> Vec<String> {
        HtmlParser.select_anchors(document)
    }
}
