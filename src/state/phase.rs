/// Crawl phase definitions for the coordinator state machine
///
/// A run moves strictly forward: `Seeding -> Running -> Draining -> Stopped`.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// The seed item is being pushed and workers are being sized
    Seeding,

    /// Fetch workers and the text processor are running
    Running,

    /// Waiting for the frontier and the text queue to report zero in-flight items
    Draining,

    /// Tasks are cancelled and the final flush has happened
    Stopped,
}

impl CrawlPhase {
    /// Returns the phase that legally follows this one, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Seeding => Some(Self::Running),
            Self::Running => Some(Self::Draining),
            Self::Draining => Some(Self::Stopped),
            Self::Stopped => None,
        }
    }

    /// Returns true if moving from this phase to `to` is allowed
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
