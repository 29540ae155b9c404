//! Canonicalization of raw references found on pages

use crate::{UrlError, UrlResult};
use url::Url;

/// Reference prefixes that never point at a crawlable resource
const IGNORED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "#"];

/// Normalizes a raw reference found on a page into a canonical URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty references
/// 2. Reject `javascript:`, `mailto:`, `tel:` and fragment-only (`#...`)
///    references (prefix match, case-insensitive)
/// 3. Resolve scheme-relative references (`//host/path`) against `https:`
/// 4. Parse absolute `http`/`https` references as-is; join anything else
///    onto `base` (relative path, absolute path, query-only forms)
/// 5. Reject the result unless it has a scheme and a non-empty host
/// 6. Drop the fragment; the remaining scheme, host, path and query form the
///    canonical serialization
///
/// The function never fails on malformed input in the sense of a crawl error:
/// every `Err` is a rejection and the reference is simply dropped.
///
/// # Examples
///
/// ```
/// use link_harvester::url::normalize;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = normalize(&base, "../about#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
///
/// assert!(normalize(&base, "mailto:team@example.com").is_err());
/// ```
pub fn normalize(base: &Url, raw: &str) -> UrlResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    if is_ignored(raw) {
        return Err(UrlError::Ignored(raw.to_string()));
    }

    let resolved = if raw.starts_with("//") {
        Url::parse(&format!("https:{}", raw))
    } else if has_http_scheme(raw) {
        Url::parse(raw)
    } else {
        base.join(raw)
    };

    let mut url = resolved.map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    Ok(url)
}

/// Normalizes a seed URL against itself
///
/// Seeds have no page to be resolved against, so a relative seed is
/// rejected the same way an unresolvable reference is.
pub fn normalize_seed(raw: &str) -> UrlResult<Url> {
    let base = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize(&base, raw)
}

fn is_ignored(raw: &str) -> bool {
    IGNORED_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_case(raw, prefix))
}

fn has_http_scheme(raw: &str) -> bool {
    starts_with_ignore_case(raw, "http://") || starts_with_ignore_case(raw, "https://")
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}
