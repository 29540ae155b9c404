//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: Tracks the state of an individual crawl task (queued, fetching, extracted, etc.)
//! - `EngineState`: Tracks the lifecycle of a whole crawl invocation

mod engine_state;
mod task_state;

// Re-export main types
pub use engine_state::{EngineState, SharedEngineState};
pub use task_state::TaskState;
