//! State module for tracking crawl progress
//!
//! This module holds the state shared by every branch of a crawl run.
//!
//! # Components
//!
//! - `UriState`: the conceptual state of a single URI (unvisited, claimed, cached, failed)
//! - `VisitState`: the dedup cache, failure set and visit counter, updated together
//!   under one lock

mod uri_state;
mod visit_state;

// Re-export main types
pub use uri_state::UriState;
pub use visit_state::{Admission, Children, Expansion, SkipReason, VisitState};
