use crate::url::UrlParts;
use std::collections::HashSet;

/// Extracts the host component (netloc) of a URL
///
/// The host is returned exactly as written, port and all; no case folding
/// and no `www.` stripping, since host matching is exact string equality.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::extract_host;
///
/// assert_eq!(extract_host("https://example.com/path"), "example.com");
/// assert_eq!(extract_host("https://example.com:8080/"), "example.com:8080");
/// assert_eq!(extract_host("/relative"), "");
/// ```
pub fn extract_host(url: &str) -> &str {
    UrlParts::split(url).netloc
}

/// Keeps only the links whose host equals the host of `page_url`
///
/// Comparison is exact and case-sensitive; subdomains never match, so
/// `www.example.com` and `example.com` are different hosts. A page URL with
/// no host matches nothing.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::filter_same_domain;
///
/// let links = ["https://example.com/a", "https://other.com/x"];
/// let same = filter_same_domain("https://example.com", links);
/// assert_eq!(same.len(), 1);
/// assert!(same.contains("https://example.com/a"));
/// ```
pub fn filter_same_domain<I, S>(page_url: &str, links: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let host = extract_host(page_url);
    if host.is_empty() {
        return HashSet::new();
    }

    links
        .into_iter()
        .filter(|link| extract_host(link.as_ref()) == host)
        .map(|link| link.as_ref().to_string())
        .collect()
}
