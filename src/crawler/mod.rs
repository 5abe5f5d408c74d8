//! Crawler module for fetching, classifying and downloading resources
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] seam
//! - HTML parsing and link extraction
//! - Content-type classification
//! - The download gate and its bounded pool
//! - Overall crawl coordination

mod classifier;
mod coordinator;
mod download;
mod fetcher;
mod parser;
mod report;

pub use classifier::{classify, classify_resource, is_html, Classification, HTML_MIME_TYPES};
pub use coordinator::Crawler;
pub use download::{destination_name, DownloadGate, DownloadOutcome, Downloader, HttpDownloader};
pub use fetcher::{build_http_client, FetchResponse, Fetcher, HttpFetcher};
pub use parser::extract_links;
pub use report::CrawlReport;

use crate::config::CrawlConfig;
use crate::SpongeError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client shared by fetches and downloads
/// 2. Create the output directory
/// 3. Crawl from the root and download every accepted resource
/// 4. Log a summary
///
/// # Arguments
///
/// * `config` - The validated crawl configuration
///
/// # Returns
///
/// * `Ok(())` - Crawl completed; individual fetch and download failures are
///   logged, not returned
/// * `Err(SpongeError)` - The HTTP client could not be built or the output
///   directory could not be created
pub async fn execute(config: CrawlConfig) -> Result<(), SpongeError> {
    let client = build_http_client(&config.http)?;

    let crawler = Arc::new(Crawler::new(
        config,
        HttpFetcher::new(client.clone()),
        HttpDownloader::new(client),
    ));

    crawler.run().await.map(|_| ())
}
