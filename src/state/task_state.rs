/// Task state definitions for tracking crawl progress
///
/// A crawl task moves `Queued -> Fetching` and then into exactly one
/// terminal state.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is waiting in the frontier
    Queued,

    /// Task's URL is being fetched
    Fetching,

    // ===== Terminal States =====
    /// Page was fetched and its links extracted
    Extracted,

    /// Fetch or extraction failed (network error, timeout, non-2xx, bad body)
    Failed,

    /// Page was not processed because its body exceeded the size limit
    Skipped,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Extracted | Self::Failed | Self::Skipped)
    }

    /// Returns true if this is an active state (task may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Returns true if a task may move from `self` to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Extracted)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Skipped)
        )
    }

    /// Validates a transition, returning the new state
    pub fn transition(self, next: TaskState) -> Result<TaskState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Queued,
            Self::Fetching,
            Self::Extracted,
            Self::Failed,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
