//! Output module for crawl results
//!
//! This module handles:
//! - The reference record type and its source kinds
//! - The result sink workers append to during a crawl
//! - Crawl statistics
//! - Exporting results as a line list, JSON, or CSV

pub mod format;
mod reference;
mod sink;
pub mod stats;

pub use format::{export_to_file, format_line, render};
pub use reference::{FoundReference, SourceKind};
pub use sink::ResultSink;
pub use stats::{print_statistics, CrawlStatistics, StatsRecorder};
