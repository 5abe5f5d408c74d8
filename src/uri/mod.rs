//! URI handling module for Sponge
//!
//! This module provides the canonical URI identity used for deduplication,
//! the canonicalizer that produces it from raw link text, and the host scope
//! check applied to discovered links.

mod canonical;
mod host;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::Url;

use crate::UriError;

// Re-export main functions
pub use canonical::canonicalize;
pub use host::{has_valid_host, host_in_scope};

/// A normalized URI used as the sole identity key of a crawl
///
/// Values are only built by [`canonicalize`], so the scheme is always http or
/// https and the host is never empty. Equality and hashing are defined on the
/// normalized string form alone.
#[derive(Debug, Clone)]
pub struct CanonicalUri(Url);

impl CanonicalUri {
    pub(crate) fn from_normalized(url: Url) -> Self {
        Self(url)
    }

    /// Returns the normalized string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host, without any leading "www."
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Returns the last path segment in its escaped form, if it is not empty
    pub fn last_segment(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
    }

    /// Returns the percent-decoded last path segment
    pub fn file_name(&self) -> Option<String> {
        let segment = self.last_segment()?;
        let decoded = urlencoding::decode(segment)
            .map(|name| name.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        Some(decoded)
    }

    /// Returns the lowercased extension of the last path segment
    ///
    /// ```
    /// use sponge::uri::canonicalize;
    ///
    /// let uri = canonicalize("https://example.com/files/Report.PDF").unwrap();
    /// assert_eq!(uri.extension(), Some("pdf".to_string()));
    /// ```
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let (_, extension) = name.rsplit_once('.')?;
        if extension.is_empty() {
            None
        } else {
            Some(extension.to_lowercase())
        }
    }
}

impl PartialEq for CanonicalUri {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CanonicalUri {}

impl Hash for CanonicalUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for CanonicalUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalUri {
    type Err = UriError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        canonicalize(raw)
    }
}
