//! Crawl statistics
//!
//! Workers record terminal task states and result counts into a
//! `StatsRecorder`; the engine takes a `CrawlStatistics` snapshot once the
//! crawl is done.

use crate::state::TaskState;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Tasks enqueued, seeds included
    pub tasks_queued: u64,

    /// Tasks whose page was fetched and extracted
    pub pages_extracted: u64,

    /// Tasks that failed to fetch or extract
    pub pages_failed: u64,

    /// Tasks skipped because the body exceeded the size limit
    pub pages_skipped: u64,

    /// References recorded in the result sink
    pub references_recorded: u64,

    /// Candidates dropped by the normalizer
    pub references_rejected: u64,

    /// Candidates dropped by the scope policy
    pub references_out_of_scope: u64,

    /// Deepest task depth that was processed
    pub deepest_depth: u32,
}

impl CrawlStatistics {
    /// Tasks that reached a terminal state
    pub fn total_finished(&self) -> u64 {
        self.pages_extracted + self.pages_failed + self.pages_skipped
    }

    /// Fetch and extraction failures, size skips included
    pub fn total_failures(&self) -> u64 {
        self.pages_failed + self.pages_skipped
    }

    /// Returns the success rate as a percentage of finished tasks
    pub fn success_rate(&self) -> f64 {
        let finished = self.total_finished();
        if finished == 0 {
            return 0.0;
        }
        (self.pages_extracted as f64 / finished as f64) * 100.0
    }
}

/// Lock-free counters shared by all workers
#[derive(Debug, Default)]
pub struct StatsRecorder {
    tasks_queued: AtomicU64,
    pages_extracted: AtomicU64,
    pages_failed: AtomicU64,
    pages_skipped: AtomicU64,
    references_recorded: AtomicU64,
    references_rejected: AtomicU64,
    references_out_of_scope: AtomicU64,
    deepest_depth: AtomicU32,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_queued(&self) {
        self.tasks_queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a task reaching `state` at `depth`
    ///
    /// Active states are ignored.
    pub fn task_finished(&self, state: TaskState, depth: u32) {
        let counter = match state {
            TaskState::Extracted => &self.pages_extracted,
            TaskState::Failed => &self.pages_failed,
            TaskState::Skipped => &self.pages_skipped,
            TaskState::Queued | TaskState::Fetching => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.deepest_depth.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn reference_recorded(&self) {
        self.references_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reference_rejected(&self) {
        self.references_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reference_out_of_scope(&self) {
        self.references_out_of_scope.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            tasks_queued: self.tasks_queued.load(Ordering::Relaxed),
            pages_extracted: self.pages_extracted.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            pages_skipped: self.pages_skipped.load(Ordering::Relaxed),
            references_recorded: self.references_recorded.load(Ordering::Relaxed),
            references_rejected: self.references_rejected.load(Ordering::Relaxed),
            references_out_of_scope: self.references_out_of_scope.load(Ordering::Relaxed),
            deepest_depth: self.deepest_depth.load(Ordering::Relaxed),
        }
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Goes to stderr so it never mixes with exported results on stdout.
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===");
    eprintln!("  Tasks queued: {}", stats.tasks_queued);
    eprintln!("  Pages extracted: {}", stats.pages_extracted);
    eprintln!("  Pages failed: {}", stats.pages_failed);
    eprintln!("  Pages skipped (size limit): {}", stats.pages_skipped);
    eprintln!("  References recorded: {}", stats.references_recorded);
    eprintln!("  Deepest depth: {}", stats.deepest_depth);
    eprintln!(
        "  Success rate: {:.1}% ({} / {} pages)",
        stats.success_rate(),
        stats.pages_extracted,
        stats.total_finished()
    );
}
