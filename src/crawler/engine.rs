//! Crawl engine - worker pool and per-task pipeline
//!
//! This module drives the crawl:
//! - Seeding the frontier from the input URLs
//! - Running a fixed pool of workers over the shared frontier
//! - Fetching, extracting, normalizing and scope-checking each task
//! - Recording results and enqueueing followable children
//! - Cancellation and the final report

use crate::config::CrawlConfig;
use crate::crawler::dedup::DedupSet;
use crate::crawler::extractor::{CandidateLink, LinkExtractor};
use crate::crawler::fetcher::{FetchRequest, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::output::{CrawlStatistics, FoundReference, ResultSink, StatsRecorder};
use crate::state::{EngineState, SharedEngineState, TaskState};
use crate::url::{in_scope, normalize, normalize_seed};
use crate::{FetchError, HarvestError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Advice printed when a crawl finds nothing and nothing failed
pub const SCOPE_HINT: &str = "No URLs were found. This usually happens when a domain is specified \
     (https://example.com), but it redirects to a subdomain (https://www.example.com). The \
     subdomain is not included in the scope, so no URLs are recorded. To overcome this, either \
     specify the final URL in the redirect chain or enable subdomains.";

/// Outcome of a finished crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Every reference recorded during the crawl
    pub sink: Arc<ResultSink>,

    pub stats: CrawlStatistics,

    /// True if the crawl stopped because it was cancelled
    pub cancelled: bool,
}

impl CrawlReport {
    /// Returns the recorded references in order
    pub fn results(&self) -> Vec<FoundReference> {
        self.sink.snapshot()
    }

    /// Returns advice when the crawl found nothing without any failure
    ///
    /// An empty result with no failures almost always means the scope
    /// rejected everything, typically because the seed redirected to a
    /// subdomain.
    pub fn scope_hint(&self) -> Option<&'static str> {
        if self.sink.is_empty() && self.stats.total_failures() == 0 && !self.cancelled {
            Some(SCOPE_HINT)
        } else {
            None
        }
    }
}

/// Bounded, scope-aware crawler over a fetcher and an extractor
pub struct CrawlEngine<F, E> {
    config: Arc<CrawlConfig>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
}

impl<F, E> CrawlEngine<F, E>
where
    F: Fetcher + 'static,
    E: LinkExtractor + 'static,
{
    pub fn new(config: CrawlConfig, fetcher: F, extractor: E) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawls from `seeds` until the frontier drains
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl finished; individual fetch failures
    ///   are counted in the report, never returned
    /// * `Err(HarvestError::NoSeeds)` - No usable seed URL was given
    pub async fn run<S: AsRef<str>>(&self, seeds: &[S]) -> Result<CrawlReport, HarvestError> {
        let sink = ResultSink::new(self.config.require_unique_results);
        self.execute(seeds, sink, CancellationToken::new()).await
    }

    /// Crawls like `run`, also sending each reference to `listener` as it is
    /// recorded
    pub async fn run_streaming<S: AsRef<str>>(
        &self,
        seeds: &[S],
        listener: UnboundedSender<FoundReference>,
    ) -> Result<CrawlReport, HarvestError> {
        let sink = ResultSink::with_listener(self.config.require_unique_results, listener);
        self.execute(seeds, sink, CancellationToken::new()).await
    }

    /// Crawls like `run` until the frontier drains or `cancel` fires
    ///
    /// On cancellation queued tasks are discarded and no new fetch starts;
    /// fetches already in flight finish or time out. A cancelled crawl is not
    /// an error: the report carries what was recorded so far.
    pub async fn run_with_cancellation<S: AsRef<str>>(
        &self,
        seeds: &[S],
        cancel: CancellationToken,
    ) -> Result<CrawlReport, HarvestError> {
        let sink = ResultSink::new(self.config.require_unique_results);
        self.execute(seeds, sink, cancel).await
    }

    /// Crawls with both a listener and a cancellation token
    pub async fn run_streaming_with_cancellation<S: AsRef<str>>(
        &self,
        seeds: &[S],
        listener: UnboundedSender<FoundReference>,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, HarvestError> {
        let sink = ResultSink::with_listener(self.config.require_unique_results, listener);
        self.execute(seeds, sink, cancel).await
    }

    async fn execute<S: AsRef<str>>(
        &self,
        seeds: &[S],
        sink: ResultSink,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, HarvestError> {
        if seeds.is_empty() {
            return Err(HarvestError::NoSeeds);
        }

        let context = Arc::new(WorkerContext {
            config: Arc::clone(&self.config),
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            frontier: Frontier::new(self.config.max_depth, cancel.clone()),
            dedup: DedupSet::new(),
            sink: Arc::new(sink),
            stats: StatsRecorder::new(),
            state: SharedEngineState::new(),
        });

        let admitted = context.seed(seeds);
        if admitted == 0 {
            return Err(HarvestError::NoSeeds);
        }

        let worker_count = self.config.worker_count();
        tracing::info!(
            "Starting crawl: {} seeds, {} workers, max depth {}, {} results",
            admitted,
            worker_count,
            self.config.max_depth,
            if context.sink.is_unique() { "unique" } else { "all" }
        );
        let start_time = Instant::now();

        let watcher = {
            let context = Arc::clone(&context);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                cancel.cancelled().await;
                if context.state.advance(EngineState::Draining) {
                    tracing::info!("Cancellation requested, draining in-flight fetches");
                }
                context.frontier.close();
            })
        };

        let workers: Vec<_> = (0..worker_count)
            .map(|id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { context.worker_loop(id).await })
            })
            .collect();

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Crawl worker terminated abnormally: {}", e);
            }
        }
        watcher.abort();

        context.state.advance(EngineState::Done);
        let cancelled = cancel.is_cancelled();
        let stats = context.stats.snapshot();

        tracing::info!(
            "Crawl {}: {} pages fetched, {} references recorded in {:?}",
            if cancelled { "cancelled" } else { "completed" },
            stats.total_finished(),
            context.sink.len(),
            start_time.elapsed()
        );

        Ok(CrawlReport {
            sink: Arc::clone(&context.sink),
            stats,
            cancelled,
        })
    }
}

/// State shared by every worker of one crawl
struct WorkerContext<F, E> {
    config: Arc<CrawlConfig>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    frontier: Frontier,
    dedup: DedupSet,
    sink: Arc<ResultSink>,
    stats: StatsRecorder,
    state: SharedEngineState,
}

/// Marks the held task complete when dropped, even if the worker panics
struct CompletionGuard<'a>(&'a Frontier);

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl<F: Fetcher, E: LinkExtractor> WorkerContext<F, E> {
    /// Admits and enqueues the seeds, returning how many were enqueued
    fn seed<S: AsRef<str>>(&self, seeds: &[S]) -> usize {
        let mut admitted = 0;

        for seed in seeds {
            let seed = seed.as_ref();
            let url = match normalize_seed(seed) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping seed {:?}: {}", seed, e);
                    continue;
                }
            };

            if !self.dedup.try_admit(&url) {
                tracing::debug!("Duplicate seed {}", url);
                continue;
            }

            if self.frontier.push(CrawlTask::seed(url)) {
                self.stats.task_queued();
                admitted += 1;
            }
        }

        admitted
    }

    async fn worker_loop(&self, id: usize) {
        tracing::trace!("Worker {} started", id);

        while let Some(task) = self.frontier.next().await {
            let _guard = CompletionGuard(&self.frontier);

            let state = match self.process_task(&task).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Error processing {}: {}", task.url, e);
                    TaskState::Failed
                }
            };
            self.stats.task_finished(state, task.depth);
        }

        tracing::trace!("Worker {} finished", id);
    }

    /// Runs one task to a terminal state
    async fn process_task(&self, task: &CrawlTask) -> Result<TaskState, HarvestError> {
        let state = TaskState::Queued.transition(TaskState::Fetching)?;
        tracing::debug!("Fetching {} (depth {})", task.url, task.depth);

        let request = FetchRequest {
            url: &task.url,
            timeout: self.config.per_request_timeout(),
            max_bytes: self.config.max_body_size,
        };

        let body = match self.fetcher.fetch(request).await {
            Ok(body) => body,
            Err(FetchError::TooLarge { limit }) => {
                tracing::debug!("Skipping {}: body exceeds {} bytes", task.url, limit);
                return state.transition(TaskState::Skipped);
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                return state.transition(TaskState::Failed);
            }
        };

        let candidates = match self.extractor.extract(&body, &task.url) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Failed to extract links from {}: {}", task.url, e);
                return state.transition(TaskState::Failed);
            }
        };

        tracing::debug!("Found {} candidates on {}", candidates.len(), task.url);
        for candidate in candidates {
            self.handle_candidate(task, candidate);
        }

        state.transition(TaskState::Extracted)
    }

    /// Records an in-scope candidate and enqueues it if it is followable
    fn handle_candidate(&self, task: &CrawlTask, candidate: CandidateLink) {
        let url = match normalize(&task.url, &candidate.raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Dropping {:?} on {}: {}", candidate.raw, task.url, e);
                self.stats.reference_rejected();
                return;
            }
        };

        if !in_scope(&self.config, &task.url, &url) {
            tracing::trace!("Out of scope: {} (found on {})", url, task.url);
            self.stats.reference_out_of_scope();
            return;
        }

        let followable = candidate.kind.is_followable() && task.depth < self.config.max_depth;
        if followable && self.dedup.try_admit(&url) && self.frontier.push(task.child(url.clone()))
        {
            self.stats.task_queued();
        }

        let reference = FoundReference::new(url, candidate.kind, Some(task.url.clone()));
        if self.sink.append(reference) {
            self.stats.reference_recorded();
        }
    }
}
