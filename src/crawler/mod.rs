//! Crawler module for the fetch-extract-enqueue pipeline
//!
//! This module contains the core crawling logic, including:
//! - The frontier and its termination protocol
//! - The per-crawl dedup set deciding which URLs are fetched
//! - The fetcher and link extractor seams with their HTTP/HTML implementations
//! - The crawl engine driving a fixed worker pool

mod dedup;
mod engine;
mod extractor;
mod fetcher;
mod frontier;

pub use dedup::DedupSet;
pub use engine::{CrawlEngine, CrawlReport, SCOPE_HINT};
pub use extractor::{CandidateLink, HtmlExtractor, LinkExtractor};
pub use fetcher::{FetchRequest, Fetcher, HttpFetcher, MAX_REDIRECTS};
pub use frontier::{CrawlTask, Frontier};

use crate::config::Config;
use crate::HarvestError;

/// Builds an engine with the HTTP fetcher and HTML extractor
///
/// # Arguments
///
/// * `config` - The full configuration; only the crawl and HTTP sections are used
///
/// # Returns
///
/// * `Ok(CrawlEngine)` - Ready to run
/// * `Err(HarvestError)` - The HTTP client could not be built
pub fn http_engine(
    config: &Config,
) -> Result<CrawlEngine<HttpFetcher, HtmlExtractor>, HarvestError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let extractor = HtmlExtractor::new()?;
    Ok(CrawlEngine::new(config.crawl.clone(), fetcher, extractor))
}
