//! Statistics for a finished crawl
//!
//! This module provides the summary the engine returns from a crawl and a
//! plain-text printer for it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    /// Repaired root URL the crawl started from
    pub root_url: String,

    /// Units of work started
    pub pages_dispatched: u64,

    /// Pages that answered 200 and were parsed
    pub pages_parsed: u64,

    /// Pages that answered with any other status
    pub pages_unavailable: u64,

    /// Pages that could not be fetched at all
    pub pages_failed: u64,

    /// Total links recorded across all parsed pages
    pub total_links: u64,

    /// Distinct URLs ever discovered
    pub urls_seen: u64,

    /// URLs still waiting when the crawl stopped
    pub urls_remaining: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Wall-clock duration in whole seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of dispatched pages that were parsed, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_dispatched > 0 {
            (self.pages_parsed as f64 / self.pages_dispatched as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Writes statistics in a human-readable block
pub fn write_statistics<W: Write>(writer: &mut W, stats: &CrawlStatistics) -> io::Result<()> {
    writeln!(writer, "=== Crawl Statistics ===")?;
    writeln!(writer)?;
    writeln!(writer, "Root: {}", stats.root_url)?;
    writeln!(writer, "  Started:  {}", stats.started_at.to_rfc3339())?;
    writeln!(writer, "  Finished: {}", stats.finished_at.to_rfc3339())?;
    writeln!(writer, "  Duration: {}s", stats.duration_seconds())?;
    writeln!(writer)?;

    writeln!(writer, "Pages:")?;
    writeln!(writer, "  Dispatched:  {}", stats.pages_dispatched)?;
    writeln!(writer, "  Parsed:      {}", stats.pages_parsed)?;
    writeln!(writer, "  Unavailable: {}", stats.pages_unavailable)?;
    writeln!(writer, "  Failed:      {}", stats.pages_failed)?;
    writeln!(writer)?;

    writeln!(writer, "URLs:")?;
    writeln!(writer, "  Seen:        {}", stats.urls_seen)?;
    writeln!(writer, "  Not crawled: {}", stats.urls_remaining)?;
    writeln!(writer, "  Links found: {}", stats.total_links)?;
    writeln!(writer)?;

    writeln!(
        writer,
        "Success Rate: {:.1}% ({} / {} pages parsed)",
        stats.success_rate(),
        stats.pages_parsed,
        stats.pages_dispatched
    )
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_statistics(&mut handle, stats)
}
