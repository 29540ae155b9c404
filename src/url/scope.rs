//! Scope policy: which discovered URLs may be reported and followed
//!
//! A candidate is in scope when both the domain predicate and the path
//! predicate hold, each evaluated against the page it was found on.

use crate::config::CrawlConfig;
use crate::url::domain::{extract_host, hosts_contain};
use url::Url;

/// Decides whether `candidate`, found on `origin`, is in scope
///
/// # Examples
///
/// ```
/// use link_harvester::config::CrawlConfig;
/// use link_harvester::url::in_scope;
/// use url::Url;
///
/// let origin = Url::parse("https://a.com/").unwrap();
/// let candidate = Url::parse("https://b.a.com/x").unwrap();
///
/// let mut config = CrawlConfig::default();
/// assert!(!in_scope(&config, &origin, &candidate));
///
/// config.follow_subdomains = true;
/// assert!(in_scope(&config, &origin, &candidate));
/// ```
pub fn in_scope(config: &CrawlConfig, origin: &Url, candidate: &Url) -> bool {
    domain_allowed(config.follow_subdomains, origin, candidate)
        && path_allowed(config.restrict_to_path_prefix, origin, candidate)
}

/// Domain predicate
///
/// Without subdomains the hosts must be equal. With subdomains either host
/// may contain the other as a suffix, so redirects that move up or down the
/// domain hierarchy (`example.com` <-> `www.example.com`) stay in scope.
pub fn domain_allowed(follow_subdomains: bool, origin: &Url, candidate: &Url) -> bool {
    let (Some(origin_host), Some(candidate_host)) = (extract_host(origin), extract_host(candidate))
    else {
        return false;
    };

    if follow_subdomains {
        hosts_contain(&candidate_host, &origin_host)
    } else {
        candidate_host == origin_host
    }
}

/// Path predicate
///
/// When restricted, the candidate path must start with the origin path and
/// the match must end on a segment boundary. Trailing slashes are taken as
/// written: an origin of `/blog/` does not admit `/blog`.
pub fn path_allowed(restrict_to_path_prefix: bool, origin: &Url, candidate: &Url) -> bool {
    if !restrict_to_path_prefix {
        return true;
    }

    let origin_path = origin.path();
    let candidate_path = candidate.path();

    match candidate_path.strip_prefix(origin_path) {
        Some(rest) => rest.is_empty() || origin_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}
