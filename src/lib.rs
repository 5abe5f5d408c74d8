//! Sponge: a bounded website crawler and file downloader
//!
//! This crate crawls a website from a root address, follows links up to a
//! bounded depth and downloads every resource whose type matches a configured
//! set, while staying inside the root host (optionally its subdomains) and a
//! global fetch cap.

pub mod config;
pub mod crawler;
pub mod state;
pub mod uri;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sponge operations
#[derive(Debug, Error)]
pub enum SpongeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URI error: {0}")]
    Uri(#[from] UriError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URI: {0}")]
    InvalidUri(#[from] UriError),
}

/// URI canonicalization errors
#[derive(Debug, Error)]
pub enum UriError {
    #[error("Failed to parse URI: {0}")]
    Parse(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Hostname cannot be empty")]
    MissingHost,

    #[error("Malformed URI: {0}")]
    Malformed(String),
}

/// Errors raised while fetching a resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {uri}: {source}")]
    Http { uri: String, source: reqwest::Error },

    #[error("HTTP {status} for {uri}")]
    Status { uri: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while downloading a file
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error for {uri}: {source}")]
    Http { uri: String, source: reqwest::Error },

    #[error("HTTP {status} for {uri}")]
    Status { uri: String, status: u16 },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for Sponge operations
pub type Result<T> = std::result::Result<T, SpongeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URI operations
pub type UriResult<T> = std::result::Result<T, UriError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{execute, CrawlReport, Crawler};
pub use state::{UriState, VisitState};
pub use uri::{canonicalize, has_valid_host, CanonicalUri};
