//! Configuration module for Sponge
//!
//! This module handles loading TOML settings files, validating them and
//! turning them into the [`CrawlConfig`] the crawler runs with. Every setting
//! has a default, so a crawl can also be configured from the command line
//! alone.
//!
//! # Example
//!
//! ```no_run
//! use sponge::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sponge.toml")).unwrap();
//! println!("Crawling {} up to depth {}", config.root, config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlerSettings, HttpSettings, Settings, DEFAULT_CONCURRENT_DOWNLOADS,
    DEFAULT_CONCURRENT_REQUESTS, DEFAULT_INCLUDE_SUBDOMAINS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_URIS,
    DEFAULT_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{load_config, load_settings};
pub use validation::validate;
pub(crate) use validation::normalize_mime_type;
