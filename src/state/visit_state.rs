//! Shared visit state of a crawl run
//!
//! The dedup cache, the failure set and the visit counter have joint
//! invariants, so they live in one structure that callers update under a
//! single lock. None of the methods here block or await.

use crate::state::UriState;
use crate::uri::CanonicalUri;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Memoized children of a document
pub type Children = Arc<HashSet<CanonicalUri>>;

/// Decision taken when a branch reaches a URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The branch now owns the URI and must fetch it
    Fetch,

    /// The URI is a cached document reached at a shallower depth than before;
    /// the branch recurses into these children without fetching again
    Expand(Children),

    /// Nothing to do
    Skip(SkipReason),
}

/// Why a URI was not fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The URI failed earlier in the run
    Failed,

    /// Another branch already took the URI at the same or a shallower depth
    AlreadyVisited,

    /// The run already used all of its fetches
    LimitReached,
}

/// Result of memoizing the children of a document
#[derive(Debug, Clone)]
pub struct Expansion {
    pub children: Children,

    /// Shallowest depth the document has been reached at so far
    pub depth: u32,

    /// False when the children were already cached
    pub newly_cached: bool,
}

/// Dedup cache, failure set and visit counter of one crawl run
#[derive(Debug)]
pub struct VisitState {
    /// Children of every document, populated once per URI
    dedup_cache: HashMap<CanonicalUri, Children>,

    /// URIs whose fetch failed
    failed_uris: HashSet<CanonicalUri>,

    /// Claimed URIs with the shallowest depth they were reached at
    claimed: HashMap<CanonicalUri, u32>,

    /// Number of fetches granted so far
    visited_count: usize,

    max_uris: usize,
}

impl VisitState {
    pub fn new(max_uris: usize) -> Self {
        Self {
            dedup_cache: HashMap::new(),
            failed_uris: HashSet::new(),
            claimed: HashMap::new(),
            visited_count: 0,
            max_uris,
        }
    }

    /// Decides what a branch reaching `uri` at `depth` has to do
    ///
    /// A fetch is granted at most once per URI and at most `max_uris` times
    /// per run. The counter is checked and incremented in the same call.
    pub fn admit(&mut self, uri: &CanonicalUri, depth: u32) -> Admission {
        if self.failed_uris.contains(uri) {
            return Admission::Skip(SkipReason::Failed);
        }

        if let Some(shallowest) = self.claimed.get_mut(uri) {
            if depth >= *shallowest {
                return Admission::Skip(SkipReason::AlreadyVisited);
            }

            *shallowest = depth;

            // Still being fetched: its owner picks up the new depth when caching
            return match self.dedup_cache.get(uri) {
                Some(children) => Admission::Expand(Arc::clone(children)),
                None => Admission::Skip(SkipReason::AlreadyVisited),
            };
        }

        if self.visited_count >= self.max_uris {
            return Admission::Skip(SkipReason::LimitReached);
        }

        self.visited_count += 1;
        self.claimed.insert(uri.clone(), depth);

        Admission::Fetch
    }

    /// Memoizes the children of `uri` unless some are already cached
    ///
    /// Only the branch that was granted the fetch of `uri` extracts its
    /// children, so the first set cached is the only one. `depth` is the depth
    /// of the calling branch; the returned depth also accounts for shallower
    /// discoveries that arrived while it was fetching.
    pub fn cache_children(
        &mut self,
        uri: &CanonicalUri,
        depth: u32,
        children: HashSet<CanonicalUri>,
    ) -> Expansion {
        let (children, newly_cached) = match self.dedup_cache.entry(uri.clone()) {
            Entry::Occupied(cached) => (Arc::clone(cached.get()), false),
            Entry::Vacant(slot) => (Arc::clone(slot.insert(Arc::new(children))), true),
        };

        let shallowest = self.claimed.entry(uri.clone()).or_insert(depth);
        *shallowest = (*shallowest).min(depth);

        Expansion {
            children,
            depth: *shallowest,
            newly_cached,
        }
    }

    /// Records a failed fetch; the URI is never admitted again
    pub fn record_failure(&mut self, uri: &CanonicalUri) {
        self.failed_uris.insert(uri.clone());
    }

    pub fn is_failed(&self, uri: &CanonicalUri) -> bool {
        self.failed_uris.contains(uri)
    }

    pub fn children_of(&self, uri: &CanonicalUri) -> Option<Children> {
        self.dedup_cache.get(uri).map(Arc::clone)
    }

    pub fn state_of(&self, uri: &CanonicalUri) -> UriState {
        if self.failed_uris.contains(uri) {
            UriState::Failed
        } else if self.dedup_cache.contains_key(uri) {
            UriState::Cached
        } else if self.claimed.contains_key(uri) {
            UriState::Claimed
        } else {
            UriState::Unvisited
        }
    }

    pub fn visited_count(&self) -> usize {
        self.visited_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_uris.len()
    }

    pub fn cached_count(&self) -> usize {
        self.dedup_cache.len()
    }
}
