//! Set of URLs already admitted for fetching
//!
//! This module handles:
//! - Atomic test-and-insert, so each canonical URL is fetched at most once
//! - Keying on the full serialized URL, fragment already removed

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Set of canonical URLs admitted to the frontier during one crawl
///
/// `try_admit` is the only synchronization point deciding whether a URL is
/// fetched: the membership test and the insertion happen under one lock, so
/// two workers racing on the same URL cannot both admit it.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: Mutex<HashSet<String>>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` if absent, returning true iff this call inserted it
    pub fn try_admit(&self, url: &Url) -> bool {
        self.lock().insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
