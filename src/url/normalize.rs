/// Scheme used when the input does not carry one
const DEFAULT_SCHEME: &str = "https";

/// The textual components of a URL, split without any validation
///
/// Splitting never fails: a bare domain such as `example.com/path` comes out
/// with an empty scheme and host and everything in `path`. Parameters
/// (`;...`) stay inside `path`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: &'a str,
    pub netloc: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    /// Splits a URL string into its components
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sitemap::url::UrlParts;
    ///
    /// let parts = UrlParts::split("https://example.com/a?b=1#c");
    /// assert_eq!(parts.scheme, "https");
    /// assert_eq!(parts.netloc, "example.com");
    /// assert_eq!(parts.path, "/a");
    /// assert_eq!(parts.query, "b=1");
    /// assert_eq!(parts.fragment, "c");
    /// ```
    pub fn split(input: &'a str) -> Self {
        let (rest, fragment) = input.split_once('#').unwrap_or((input, ""));
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (scheme, rest) = split_scheme(rest);

        let (netloc, path) = match rest.strip_prefix("//") {
            Some(authority) => match authority.find('/') {
                Some(index) => authority.split_at(index),
                None => (authority, ""),
            },
            None => ("", rest),
        };

        Self {
            scheme,
            netloc,
            path,
            query,
            fragment,
        }
    }

    /// Reassembles the components, dropping an empty query or fragment
    pub fn unsplit(&self) -> String {
        let mut url = String::with_capacity(
            self.scheme.len() + self.netloc.len() + self.path.len() + self.query.len() + 8,
        );

        if !self.scheme.is_empty() {
            url.push_str(self.scheme);
            url.push(':');
        }
        if !self.scheme.is_empty() || !self.netloc.is_empty() {
            url.push_str("//");
            url.push_str(self.netloc);
        }
        url.push_str(self.path);

        if !self.query.is_empty() {
            url.push('?');
            url.push_str(self.query);
        }
        if !self.fragment.is_empty() {
            url.push('#');
            url.push_str(self.fragment);
        }

        url
    }
}

/// Separates a leading `scheme:` from the rest of the input
///
/// `example.com:8080/path` is a host with a port, not a URL with the scheme
/// `example.com`, so a colon followed only by digits is never a scheme
/// delimiter.
fn split_scheme(input: &str) -> (&str, &str) {
    let Some(index) = input.find(':') else {
        return ("", input);
    };

    let (candidate, after) = (&input[..index], &input[index + 1..]);

    let valid = candidate
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return ("", input);
    }

    let port = after.split('/').next().unwrap_or("");
    if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
        return ("", input);
    }

    (candidate, after)
}

/// Repairs a possibly incomplete URL into an absolute one
///
/// # Repair Steps
///
/// 1. Split into scheme, host, path, query and fragment
/// 2. A missing scheme becomes `https`; the scheme is lowercased
/// 3. A missing host is taken from the first path segment, which covers
///    bare-domain input such as `example.com` or `example.com/path`
/// 4. Reassemble
///
/// Nothing else is canonicalized: trailing slashes and path case are kept,
/// so two URLs are equal exactly when their repaired strings are equal.
/// Repair is idempotent.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::repair_url;
///
/// assert_eq!(repair_url("example.com"), "https://example.com");
/// assert_eq!(repair_url("example.com/path"), "https://example.com/path");
/// assert_eq!(repair_url("http://example.com/"), "http://example.com/");
/// ```
pub fn repair_url(url: &str) -> String {
    let parts = UrlParts::split(url);

    let scheme = if parts.scheme.is_empty() {
        DEFAULT_SCHEME.to_string()
    } else {
        parts.scheme.to_ascii_lowercase()
    };

    let (netloc, path) = if parts.netloc.is_empty() {
        let shifted = parts.path.trim_start_matches('/');
        match shifted.find('/') {
            Some(index) => shifted.split_at(index),
            None => (shifted, ""),
        }
    } else {
        (parts.netloc, parts.path)
    };

    UrlParts {
        scheme: &scheme,
        netloc,
        path,
        ..parts
    }
    .unsplit()
}
