use crate::config::validation::{normalize_extension, normalize_mime_type, validate};
use crate::uri::{canonicalize, CanonicalUri};
use crate::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_MAX_DEPTH: u32 = 1;
pub const DEFAULT_MAX_URIS: usize = 1_000_000;
pub const DEFAULT_INCLUDE_SUBDOMAINS: bool = false;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 1;
pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings as read from a TOML file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Crawl behavior settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerSettings {
    /// Root address the crawl starts from
    pub uri: Option<String>,

    /// Directory downloaded files are written to
    pub output: Option<PathBuf>,

    /// MIME types of the resources to download
    pub mime_types: Vec<String>,

    /// File extensions of the resources to download
    pub file_extensions: Vec<String>,

    /// Maximum number of link hops from the root
    pub max_depth: u32,

    /// Maximum number of URIs fetched over the whole run
    pub max_uris: usize,

    /// Whether subdomains of the root host are crawled
    pub include_subdomains: bool,

    /// Size of the fetch pool
    pub concurrent_requests: usize,

    /// Size of the download pool
    pub concurrent_downloads: usize,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            uri: None,
            output: None,
            mime_types: Vec::new(),
            file_extensions: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_uris: DEFAULT_MAX_URIS,
            include_subdomains: DEFAULT_INCLUDE_SUBDOMAINS,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
        }
    }
}

/// HTTP client settings shared by the fetcher and the downloader
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpSettings {
    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("sponge/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Validated configuration of a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub root: CanonicalUri,
    pub output_dir: PathBuf,
    /// Lowercased MIME types, without parameters
    pub mime_types: HashSet<String>,
    /// Lowercased extensions, without a leading "."
    pub file_extensions: HashSet<String>,
    pub max_depth: u32,
    /// Always at least 1
    pub max_uris: usize,
    pub include_subdomains: bool,
    pub concurrent_requests: usize,
    pub concurrent_downloads: usize,
    pub http: HttpSettings,
}

impl CrawlConfig {
    /// Creates a configuration with default limits and no accepted types
    pub fn new(root: CanonicalUri, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root,
            output_dir: output_dir.into(),
            mime_types: HashSet::new(),
            file_extensions: HashSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_uris: DEFAULT_MAX_URIS,
            include_subdomains: DEFAULT_INCLUDE_SUBDOMAINS,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            http: HttpSettings::default(),
        }
    }
}

impl TryFrom<Settings> for CrawlConfig {
    type Error = ConfigError;

    fn try_from(settings: Settings) -> Result<Self, Self::Error> {
        validate(&settings)?;

        let Settings { crawler, http } = settings;

        let raw_uri = crawler
            .uri
            .ok_or_else(|| ConfigError::Validation("uri is required".to_string()))?;
        let root = canonicalize(&raw_uri)?;

        let output_dir = crawler
            .output
            .ok_or_else(|| ConfigError::Validation("output is required".to_string()))?;

        Ok(Self {
            root,
            output_dir,
            mime_types: crawler
                .mime_types
                .iter()
                .map(|mime_type| normalize_mime_type(mime_type))
                .filter(|mime_type| !mime_type.is_empty())
                .collect(),
            file_extensions: crawler
                .file_extensions
                .iter()
                .map(|extension| normalize_extension(extension))
                .filter(|extension| !extension.is_empty())
                .collect(),
            max_depth: crawler.max_depth,
            max_uris: crawler.max_uris,
            include_subdomains: crawler.include_subdomains,
            concurrent_requests: crawler.concurrent_requests,
            concurrent_downloads: crawler.concurrent_downloads,
            http,
        })
    }
}
