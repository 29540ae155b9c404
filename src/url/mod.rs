//! URL handling module for Link-Harvester
//!
//! This module provides reference normalization, host extraction and the
//! scope policy that decides which discovered URLs are eligible.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::{extract_host, hosts_contain};
pub use normalize::{normalize, normalize_seed};
pub use scope::{domain_allowed, in_scope, path_allowed};
