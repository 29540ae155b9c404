//! Frontier of crawl tasks shared by the worker pool
//!
//! This module handles:
//! - FIFO queueing of tasks produced at arbitrary depths
//! - The depth limit, enforced when a task is enqueued
//! - Termination detection via a pending-task counter
//! - Closing the queue when the crawl is cancelled

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A URL admitted for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Canonical URL to fetch
    pub url: Url,

    /// Number of hyperlink hops from a seed (seeds are 0)
    pub depth: u32,

    /// Page this URL was found on; `None` for seeds
    pub origin: Option<Url>,
}

impl CrawlTask {
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            origin: None,
        }
    }

    /// Task for a hyperlink found on this task's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
            origin: Some(self.url.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTask>,
    /// Tasks queued or held by a worker and not yet completed
    pending: usize,
    closed: bool,
}

/// Work queue with dynamic fan-out termination
///
/// A task counts as pending from `push` until the worker that popped it calls
/// `complete`. `next` returns `None` only when nothing is queued and nothing
/// is pending (every producer has finished), or when the frontier is closed.
/// An empty queue alone is not the end of the crawl: an in-flight task may
/// still produce children.
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    max_depth: u32,
    cancel: CancellationToken,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Tasks deeper than this are never enqueued
    /// * `cancel` - Token that closes the frontier when cancelled
    pub fn new(max_depth: u32, cancel: CancellationToken) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            max_depth,
            cancel,
        }
    }

    /// Enqueues a task, returning false if it was refused
    ///
    /// Tasks are refused when the frontier is closed or when their depth
    /// exceeds the limit.
    pub fn push(&self, task: CrawlTask) -> bool {
        if task.depth > self.max_depth {
            tracing::warn!(
                "Refusing task {} at depth {} (max {})",
                task.url,
                task.depth,
                self.max_depth
            );
            return false;
        }

        {
            let mut state = self.lock();
            if state.closed {
                tracing::trace!("Frontier closed, dropping {}", task.url);
                return false;
            }
            state.queue.push_back(task);
            state.pending += 1;
        }

        self.notify.notify_one();
        true
    }

    /// Waits for the next task
    ///
    /// # Returns
    ///
    /// * `Some(CrawlTask)` - A task the caller now owns and must `complete`
    /// * `None` - The crawl is finished or cancelled
    pub async fn next(&self) -> Option<CrawlTask> {
        loop {
            if self.cancel.is_cancelled() {
                self.close();
                return None;
            }

            // Register interest before inspecting the state so a wake-up
            // between the check and the await is not lost.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(task) = state.queue.pop_front() {
                    return Some(task);
                }
                if state.pending == 0 {
                    return None;
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = self.cancel.cancelled() => {}
            }
        }
    }

    /// Marks a task returned by `next` as finished
    pub fn complete(&self) {
        let finished = {
            let mut state = self.lock();
            state.pending = state.pending.saturating_sub(1);
            state.pending == 0
        };

        if finished {
            self.notify.notify_waiters();
        }
    }

    /// Closes the frontier, discarding queued tasks
    ///
    /// Tasks already handed to workers stay pending until completed; any
    /// children they produce are refused.
    pub fn close(&self) {
        let discarded = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let discarded = state.queue.len();
            state.queue.clear();
            state.pending = state.pending.saturating_sub(discarded);
            discarded
        };

        tracing::debug!("Frontier closed, discarded {} queued tasks", discarded);
        self.notify.notify_waiters();
    }

    /// Tasks queued or in flight
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    /// Tasks waiting in the queue
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
