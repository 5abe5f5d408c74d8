//! Crawler coordinator - crawl orchestration logic
//!
//! This module drives the recursive traversal of a site:
//! - Admitting each URI through the shared visit state (dedup, failures, fetch cap)
//! - Fetching on the bounded fetch pool and classifying the response
//! - Extracting, canonicalizing and host-filtering the links of documents, once per URI
//! - Fanning out to children and joining them before a visit completes
//! - Handing downloadable resources to the download gate
//!
//! Every error below the output directory creation stays local to the visit
//! of the URI that raised it.

use crate::config::CrawlConfig;
use crate::crawler::classifier::{classify_resource, Classification};
use crate::crawler::download::{DownloadGate, Downloader};
use crate::crawler::fetcher::{FetchResponse, Fetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::report::CrawlReport;
use crate::state::{Admission, Expansion, SkipReason, UriState, VisitState};
use crate::uri::{canonicalize, has_valid_host, CanonicalUri};
use crate::SpongeError;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Main crawler structure
///
/// The fetch pool bounds in-flight fetches only. A permit is held for the
/// duration of one fetch and released before the visit waits on its
/// children, so a deep recursion can never starve itself of permits.
pub struct Crawler<F, D> {
    config: CrawlConfig,
    fetcher: F,
    gate: DownloadGate<D>,
    fetch_permits: Semaphore,
    state: Mutex<VisitState>,
    stats: Mutex<CrawlReport>,
}

impl<F: Fetcher, D: Downloader> Crawler<F, D> {
    /// Creates a crawler for one run
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    /// * `fetcher` - Source of responses for every visited URI
    /// * `downloader` - Transfers accepted files into the output directory
    pub fn new(config: CrawlConfig, fetcher: F, downloader: D) -> Self {
        let gate = DownloadGate::new(
            downloader,
            config.output_dir.clone(),
            config.concurrent_downloads,
        );
        let fetch_permits = Semaphore::new(config.concurrent_requests.max(1));
        let state = Mutex::new(VisitState::new(config.max_uris));

        Self {
            config,
            fetcher,
            gate,
            fetch_permits,
            state,
            stats: Mutex::new(CrawlReport::default()),
        }
    }

    /// Runs the crawl to completion
    ///
    /// This method:
    /// 1. Creates the output directory; failing to do so is the only fatal error
    /// 2. Visits the root at depth 0
    /// 3. Returns once every reachable visit within the depth and fetch limits has completed
    pub async fn run(self: Arc<Self>) -> Result<CrawlReport, SpongeError> {
        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| SpongeError::OutputDirectory {
                path: output_dir.clone(),
                source,
            })?;

        tracing::info!(
            "Crawling {} (max depth {}, max URIs {}) into {}",
            self.config.root,
            self.config.max_depth,
            self.config.max_uris,
            output_dir.display()
        );

        let root = self.config.root.clone();
        Arc::clone(&self).visit(root, 0).await;

        let report = self.report();
        report.log_summary();

        Ok(report)
    }

    /// Returns the counters of the run so far
    pub fn report(&self) -> CrawlReport {
        let state = self.state();
        let mut report = self.stats().clone();
        report.fetched = state.visited_count();
        report.documents = state.cached_count();
        report.failed = state.failed_count();
        report
    }

    /// Returns the current state of a URI in this run
    pub fn uri_state(&self, uri: &CanonicalUri) -> UriState {
        self.state().state_of(uri)
    }

    /// Visits a URI and, for documents within the depth limit, all of its children
    ///
    /// The returned future completes only after every child visit it spawned
    /// has completed.
    fn visit(self: Arc<Self>, uri: CanonicalUri, depth: u32) -> BoxFuture<'static, ()> {
        async move {
            let admission = self.state().admit(&uri, depth);

            let (children, depth) = match admission {
                Admission::Fetch => match self.process(&uri, depth).await {
                    Some(expansion) => (expansion.children, expansion.depth),
                    None => return,
                },
                Admission::Expand(children) => {
                    tracing::debug!("Expanding {} again from depth {}", uri, depth);
                    (children, depth)
                }
                Admission::Skip(SkipReason::LimitReached) => {
                    tracing::debug!("Fetch limit reached, skipping {}", uri);
                    self.stats().limit_skips += 1;
                    return;
                }
                Admission::Skip(reason) => {
                    tracing::trace!("Skipping {} ({:?})", uri, reason);
                    return;
                }
            };

            if depth >= self.config.max_depth {
                return;
            }

            let mut child_visits = JoinSet::new();
            for child in children.iter() {
                child_visits.spawn(Arc::clone(&self).visit(child.clone(), depth + 1));
            }

            while let Some(joined) = child_visits.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("A child visit of {} did not complete: {}", uri, e);
                }
            }
        }
        .boxed()
    }

    /// Fetches and classifies a URI this branch owns
    ///
    /// Returns the memoized children when the URI is a document.
    async fn process(&self, uri: &CanonicalUri, depth: u32) -> Option<Expansion> {
        let fetched = {
            let _permit = match self.fetch_permits.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::warn!("Fetch pool closed before {}: {}", uri, e);
                    return None;
                }
            };
            self.fetcher.fetch(uri).await
        };

        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Processing failed for {}: {}", uri, e);
                self.state().record_failure(uri);
                return None;
            }
        };

        match classify_resource(&response.content_type, uri, &self.config) {
            Classification::Document => Some(self.cache_children(uri, depth, &response)),
            Classification::Downloadable => {
                let outcome = self.gate.admit(uri).await;
                self.stats().record_download(&outcome);
                None
            }
            Classification::Ignored => {
                tracing::debug!("Ignoring {} ({})", uri, response.content_type);
                self.stats().ignored += 1;
                None
            }
        }
    }

    /// Extracts the children of a document and memoizes them
    ///
    /// Parsing happens before the state lock is taken.
    fn cache_children(
        &self,
        uri: &CanonicalUri,
        depth: u32,
        response: &FetchResponse,
    ) -> Expansion {
        let children = self.discover_children(response);
        let expansion = self.state().cache_children(uri, depth, children);

        if expansion.newly_cached {
            tracing::info!(
                "Discovered document {} ({} links in scope)",
                uri,
                expansion.children.len()
            );
        }

        expansion
    }

    /// Extracts, canonicalizes, deduplicates and host-filters the links of a document
    fn discover_children(&self, response: &FetchResponse) -> HashSet<CanonicalUri> {
        let body = response.body.as_deref().unwrap_or_default();

        extract_links(body, &response.resolved_uri)
            .into_iter()
            .filter_map(|link| match canonicalize(&link) {
                Ok(child) => Some(child),
                Err(e) => {
                    tracing::warn!("URI parsing failed for {}: {}", link, e);
                    None
                }
            })
            .filter(|child| has_valid_host(child, &self.config))
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, VisitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stats(&self) -> MutexGuard<'_, CrawlReport> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
