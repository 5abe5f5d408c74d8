//! Sponge main entry point
//!
//! This is the command-line interface for the Sponge crawler.

use anyhow::Context;
use clap::Parser;
use sponge::config::{load_settings, CrawlConfig, Settings};
use sponge::crawler::execute;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sponge: crawls a website and downloads the files you ask for
///
/// Sponge follows links from a root address up to a bounded depth, staying on
/// the root host, and saves every resource whose MIME type or file extension
/// matches into the output directory. Files already present there are left
/// untouched.
#[derive(Parser, Debug)]
#[command(name = "sponge")]
#[command(version)]
#[command(about = "Crawls a website and downloads matching files", long_about = None)]
struct Cli {
    /// Root address to start crawling from
    #[arg(short, long)]
    uri: Option<String>,

    /// Directory to write downloaded files to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// MIME type to download (repeatable)
    #[arg(short = 't', long = "mime-type", value_name = "TYPE")]
    mime_types: Vec<String>,

    /// File extension to download (repeatable)
    #[arg(short = 'e', long = "file-extension", value_name = "EXT")]
    file_extensions: Vec<String>,

    /// Maximum number of link hops from the root
    #[arg(short, long)]
    depth: Option<u32>,

    /// Maximum number of URIs fetched over the whole run
    #[arg(short, long)]
    max_uris: Option<usize>,

    /// Also crawl subdomains of the root host
    #[arg(short = 's', long)]
    include_subdomains: bool,

    /// Number of concurrent fetches
    #[arg(short = 'R', long)]
    concurrent_requests: Option<usize>,

    /// Number of concurrent downloads
    #[arg(short = 'r', long)]
    concurrent_downloads: Option<usize>,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to a TOML settings file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies the flags given on the command line over `settings`
    fn apply(self, settings: &mut Settings) {
        let crawler = &mut settings.crawler;

        if let Some(uri) = self.uri {
            crawler.uri = Some(uri);
        }
        if let Some(output) = self.output {
            crawler.output = Some(output);
        }
        if !self.mime_types.is_empty() {
            crawler.mime_types = self.mime_types;
        }
        if !self.file_extensions.is_empty() {
            crawler.file_extensions = self.file_extensions;
        }
        if let Some(depth) = self.depth {
            crawler.max_depth = depth;
        }
        if let Some(max_uris) = self.max_uris {
            crawler.max_uris = max_uris;
        }
        if self.include_subdomains {
            crawler.include_subdomains = true;
        }
        if let Some(requests) = self.concurrent_requests {
            crawler.concurrent_requests = requests;
        }
        if let Some(downloads) = self.concurrent_downloads {
            crawler.concurrent_downloads = downloads;
        }

        if let Some(user_agent) = self.user_agent {
            settings.http.user_agent = user_agent;
        }
        if let Some(timeout) = self.timeout {
            settings.http.timeout_secs = timeout;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut settings = match &cli.config {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            load_settings(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        }
        None => Settings::default(),
    };
    cli.apply(&mut settings);

    let config = match CrawlConfig::try_from(settings) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::debug!("Accepted MIME types: {:?}", config.mime_types);
    tracing::debug!("Accepted file extensions: {:?}", config.file_extensions);

    match execute(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "sponge=info,warn",
            1 => "sponge=debug,info",
            2 => "sponge=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
