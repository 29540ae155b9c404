//! Configuration module for Link-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and parsing the `Name: Value;;Name2: Value2` header strings
//! accepted on the command line.
//!
//! # Example
//!
//! ```no_run
//! use link_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, HttpConfig, OutputConfig, OutputFormat, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, parse_header_list};
pub use validation::{validate, validate_crawl_config, MAX_CONCURRENCY};
