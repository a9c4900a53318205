use crate::url::UrlParts;
use crate::UrlError;
use url::Url;

/// Resolves an href found on `page_url` into an absolute URL
///
/// An href that already names a scheme is returned as-is. A relative
/// reference is joined against the page URL with standard URL-join
/// semantics, keeping the page's scheme and host text exactly as written:
/// `https://Example.com:443` plus `/a` gives `https://Example.com:443/a`,
/// and `https://example.com` plus `#top` gives `https://example.com#top`.
///
/// # Arguments
///
/// * `page_url` - The absolute URL of the page the href was found on
/// * `href` - The raw href attribute value
///
/// # Returns
///
/// * `Ok(String)` - The absolute URL
/// * `Err(UrlError)` - The page URL or the joined result could not be parsed
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::resolve_href;
///
/// let page = "https://www.web-crawlers.com";
/// assert_eq!(
///     resolve_href(page, "/miles-morales").unwrap(),
///     "https://www.web-crawlers.com/miles-morales"
/// );
/// assert_eq!(
///     resolve_href(page, "https://other.com/x").unwrap(),
///     "https://other.com/x"
/// );
/// ```
pub fn resolve_href(page_url: &str, href: &str) -> Result<String, UrlError> {
    let reference = UrlParts::split(href);
    if !reference.scheme.is_empty() {
        return Ok(href.to_string());
    }

    let base = Url::parse(page_url).map_err(|e| UrlError::Parse(format!("{}: {}", page_url, e)))?;
    let page = UrlParts::split(page_url);

    if href.is_empty() {
        return Ok(page_url.to_string());
    }
    if href.starts_with("//") {
        return Ok(format!("{}:{}", page.scheme, href));
    }

    let resolved = match href.chars().next() {
        Some('#') => UrlParts {
            fragment: reference.fragment,
            ..page
        }
        .unsplit(),
        Some('?') => UrlParts {
            query: reference.query,
            fragment: reference.fragment,
            ..page
        }
        .unsplit(),
        _ => {
            // The url crate resolves dot segments; host text stays the page's own
            let joined = base
                .join(href)
                .map_err(|e| UrlError::Parse(format!("{} relative to {}: {}", href, page_url, e)))?;
            if joined.scheme() != base.scheme() {
                return Ok(joined.into());
            }
            UrlParts {
                path: joined.path(),
                query: joined.query().unwrap_or(""),
                fragment: joined.fragment().unwrap_or(""),
                ..page
            }
            .unsplit()
        }
    };

    Ok(resolved)
}
