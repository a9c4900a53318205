//! Site map rendering
//!
//! This module renders the collected site graph either as an indented text
//! listing or as a JSON object of URL to link array. Both orderings are
//! sorted so the same crawl always renders the same way.

use crate::state::SiteData;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// How the site map is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One block per page: the URL, then `  - link` lines
    #[default]
    Text,
    /// A JSON object mapping each page URL to its sorted links
    Json,
}

/// Sorted view of the site graph
fn sorted(site_data: &SiteData) -> BTreeMap<&str, Vec<&str>> {
    site_data
        .iter()
        .map(|(url, links)| {
            let mut links: Vec<&str> = links.iter().map(String::as_str).collect();
            links.sort_unstable();
            (url.as_str(), links)
        })
        .collect()
}

/// Formats the site graph as text
///
/// ```text
/// https://example.com
///   - https://example.com/a
///   - https://other.com/c
///
/// ```
pub fn format_text_site_map(site_data: &SiteData) -> String {
    let mut text = String::new();

    for (url, links) in sorted(site_data) {
        text.push_str(url);
        text.push('\n');
        for link in links {
            text.push_str(&format!("  - {}\n", link));
        }
        text.push('\n');
    }

    text
}

/// Formats the site graph as pretty-printed JSON
pub fn format_json_site_map(site_data: &SiteData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&sorted(site_data))
}

/// Writes the site graph in the requested format
pub fn write_site_map<W: Write>(
    writer: &mut W,
    site_data: &SiteData,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writer.write_all(format_text_site_map(site_data).as_bytes()),
        OutputFormat::Json => {
            let json = format_json_site_map(site_data).map_err(io::Error::from)?;
            writeln!(writer, "{}", json)
        }
    }
}
