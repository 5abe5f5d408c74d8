//! Crawl statistics collected during a run

use crate::crawler::download::DownloadOutcome;
use std::fmt;

/// Counters describing a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Fetches granted, bounded by the configured maximum
    pub fetched: usize,

    /// Documents whose links were extracted
    pub documents: usize,

    /// Files written to the output directory
    pub downloaded: usize,

    /// Downloadable resources whose file already existed
    pub already_present: usize,

    /// URIs whose fetch failed
    pub failed: usize,

    /// Transfers that failed
    pub download_failures: usize,

    /// Downloadable resources without a usable file name
    pub unnamed: usize,

    /// Fetched resources that were neither documents nor accepted files
    pub ignored: usize,

    /// URIs skipped because the fetch limit was reached
    pub limit_skips: usize,
}

impl CrawlReport {
    pub(crate) fn record_download(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::AlreadyPresent(_) => self.already_present += 1,
            DownloadOutcome::NoFileName => self.unnamed += 1,
            DownloadOutcome::Failed => self.download_failures += 1,
        }
    }

    /// Logs a one-line summary at info level
    pub fn log_summary(&self) {
        tracing::info!("Crawl completed: {}", self);
        if self.limit_skips > 0 {
            tracing::info!(
                "Fetch limit reached; {} discovered URIs were not fetched",
                self.limit_skips
            );
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} documents, {} downloaded, {} already present, {} failed, {} download failures",
            self.fetched,
            self.documents,
            self.downloaded,
            self.already_present,
            self.failed,
            self.download_failures
        )
    }
}
