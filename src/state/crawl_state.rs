/// Crawl run state definitions
///
/// A run moves `Idle → Running → {Completed, Aborted}`; the terminal states
/// never change again.
use crate::graph::CrawlOutcome;
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Created, loop not started yet
    Idle,

    /// Loop is iterating over the frontier
    Running,

    // ===== Terminal States =====
    /// Frontier exhausted or page limit reached
    Completed,

    /// Halted by an external cancellation request
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Converts the state to its stored string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    /// Parses a state from its stored string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}

impl From<CrawlOutcome> for CrawlState {
    fn from(outcome: CrawlOutcome) -> Self {
        match outcome {
            CrawlOutcome::Completed => Self::Completed,
            CrawlOutcome::Aborted => Self::Aborted,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
