/// Page state definitions for tracking crawl progress
///
/// This module defines the lifecycle a URL goes through during a crawl.
use std::fmt;

/// Represents the current state of a URL in the crawl process
///
/// The lifecycle is strictly linear: `Unseen → Queued → InFlight → Done`.
/// `Unseen` is never stored; it is the absence of a URL from `seen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// URL has never been accepted into the frontier
    Unseen,

    /// URL is waiting in `to_visit`
    Queued,

    /// URL's fetch-and-parse unit of work is running
    InFlight,

    /// URL's unit of work has finished, successfully or not
    Done,
}

impl PageState {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Unseen, Self::Queued)
                | (Self::Queued, Self::InFlight)
                | (Self::InFlight, Self::Done)
        )
    }

    /// Returns a short lowercase name for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Queued => "queued",
            Self::InFlight => "in_flight",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
