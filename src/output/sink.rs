//! Collection of crawl results
//!
//! This module handles:
//! - Appending references from every worker under one lock
//! - Optional dedup on URL, where the first recording wins
//! - Forwarding each recorded reference to a live listener

use crate::output::reference::FoundReference;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Default)]
struct SinkInner {
    records: Vec<FoundReference>,
    /// URLs already recorded, tracked only in unique mode
    seen: HashSet<String>,
}

/// Ordered record of every reference the crawl reported
///
/// Order is discovery order. When `unique` is set, a URL is recorded only the
/// first time it is appended, whatever its source kind or origin.
#[derive(Debug)]
pub struct ResultSink {
    inner: Mutex<SinkInner>,
    unique: bool,
    listener: Option<UnboundedSender<FoundReference>>,
}

impl ResultSink {
    /// Creates an empty sink
    pub fn new(unique: bool) -> Self {
        Self {
            inner: Mutex::new(SinkInner::default()),
            unique,
            listener: None,
        }
    }

    /// Creates a sink that also forwards each recorded reference to `listener`
    ///
    /// A closed listener is ignored; recording continues.
    pub fn with_listener(unique: bool, listener: UnboundedSender<FoundReference>) -> Self {
        Self {
            listener: Some(listener),
            ..Self::new(unique)
        }
    }

    /// Appends a reference, returning false if it was suppressed as a duplicate
    pub fn append(&self, reference: FoundReference) -> bool {
        let mut inner = self.lock();

        if self.unique && !inner.seen.insert(reference.url.as_str().to_string()) {
            return false;
        }

        if let Some(listener) = &self.listener {
            // Sent under the lock so listeners observe sink order.
            let _ = listener.send(reference.clone());
        }
        inner.records.push(reference);
        true
    }

    /// Returns the references recorded so far, in order
    pub fn snapshot(&self) -> Vec<FoundReference> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    fn lock(&self) -> MutexGuard<'_, SinkInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SourceKind;
    use std::sync::Arc;
    use url::Url;

    fn reference(url: &str, kind: SourceKind, origin: &str) -> FoundReference {
        FoundReference::new(
            Url::parse(url).unwrap(),
            kind,
            Some(Url::parse(origin).unwrap()),
        )
    }

    #[test]
    fn test_append_preserves_order() {
        let sink = ResultSink::new(false);
        sink.append(reference("https://a.com/1", SourceKind::Href, "https://a.com/"));
        sink.append(reference("https://a.com/2", SourceKind::Script, "https://a.com/"));

        let records = sink.snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url.as_str(), "https://a.com/1");
        assert_eq!(records[1].url.as_str(), "https://a.com/2");
    }

    #[test]
    fn test_duplicates_kept_when_not_unique() {
        let sink = ResultSink::new(false);
        assert!(!sink.is_unique());
        assert!(sink.append(reference("https://a.com/x", SourceKind::Href, "https://a.com/")));
        assert!(sink.append(reference("https://a.com/x", SourceKind::FormAction, "https://a.com/y")));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_unique_mode_dedups_on_url() {
        let sink = ResultSink::new(true);
        assert!(sink.is_unique());
        assert!(sink.append(reference("https://a.com/x", SourceKind::Href, "https://a.com/")));
        assert!(!sink.append(reference("https://a.com/x", SourceKind::Script, "https://a.com/y")));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.snapshot()[0].source_kind, SourceKind::Href);
    }

    #[test]
    fn test_empty() {
        let sink = ResultSink::new(true);
        assert!(sink.is_empty());
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn test_listener_receives_recorded_references() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ResultSink::with_listener(true, tx);

        sink.append(reference("https://a.com/x", SourceKind::Href, "https://a.com/"));
        sink.append(reference("https://a.com/x", SourceKind::Href, "https://a.com/"));
        sink.append(reference("https://a.com/y", SourceKind::Href, "https://a.com/"));

        assert_eq!(rx.try_recv().unwrap().url.as_str(), "https://a.com/x");
        assert_eq!(rx.try_recv().unwrap().url.as_str(), "https://a.com/y");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_listener_does_not_block_recording() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let sink = ResultSink::with_listener(false, tx);
        assert!(sink.append(reference("https://a.com/x", SourceKind::Href, "https://a.com/")));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let sink = Arc::new(ResultSink::new(true));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let url = format!("https://a.com/{}", (worker * 50 + i) % 100);
                        sink.append(reference(&url, SourceKind::Href, "https://a.com/"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.len(), 100);
    }
}
