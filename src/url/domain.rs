//! Host extraction and comparison
//!
//! This module handles:
//! - Extracting the lowercased host of a URL, without its port
//! - The bidirectional suffix test used for domain scope

use url::Url;

/// Extracts the host from a URL, lowercased
///
/// The port is not part of the host; two URLs differing only by port share a
/// host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use link_harvester::url::extract_host;
///
/// let url = Url::parse("https://Blog.Example.com:8443/path").unwrap();
/// assert_eq!(extract_host(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two hosts are related by literal suffix containment
///
/// True when either host string ends with the other. This deliberately does
/// not require a label boundary: `notexample.com` and `example.com` are
/// related.
pub fn hosts_contain(a: &str, b: &str) -> bool {
    a.ends_with(b) || b.ends_with(a)
}
