/// URI state definitions for tracking crawl progress
use std::fmt;

/// Represents the state of a URI within a single crawl run
///
/// A URI moves from `Unvisited` to `Claimed` when a branch takes it for
/// fetching, then to `Cached` once its links are extracted or `Failed` when
/// its fetch fails. Non-document resources stay `Claimed` after their visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriState {
    /// Not reached by any branch yet
    Unvisited,

    /// Taken by a branch for fetching
    Claimed,

    /// Document whose children are memoized in the dedup cache
    Cached,

    /// Fetch failed; never retried within the run
    Failed,
}

impl UriState {
    /// Returns true if a branch already took this URI
    pub fn is_visited(&self) -> bool {
        !matches!(self, Self::Unvisited)
    }

    /// Returns true if this state can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cached | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::Claimed => "claimed",
            Self::Cached => "cached",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
