use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one crawl invocation
///
/// `Running` while workers pull tasks, `Draining` once cancellation has been
/// observed and only in-flight fetches remain, `Done` after every worker has
/// exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    Running,
    Draining,
    Done,
}

impl EngineState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Draining => 1,
            Self::Done => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Done,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        write!(f, "{}", label)
    }
}

/// Engine state shared between the engine and its workers
///
/// Transitions only move forward; a request to go back is ignored.
#[derive(Debug)]
pub struct SharedEngineState(AtomicU8);

impl SharedEngineState {
    pub fn new() -> Self {
        Self(AtomicU8::new(EngineState::Running.as_u8()))
    }

    pub fn get(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Advances to `next`, returning true if the state changed
    pub fn advance(&self, next: EngineState) -> bool {
        let target = next.as_u8();
        let previous = self.0.fetch_max(target, Ordering::AcqRel);
        previous < target
    }
}

impl Default for SharedEngineState {
    fn default() -> Self {
        Self::new()
    }
}
