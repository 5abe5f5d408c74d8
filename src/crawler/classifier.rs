//! Fetch result classification
//!
//! Decides from a response's content type whether a resource is a document
//! to extract links from, a file to download, or something to ignore.

use crate::config::{normalize_mime_type, CrawlConfig};
use crate::uri::CanonicalUri;
use std::collections::HashSet;

/// The two content types treated as HTML documents
pub const HTML_MIME_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// What to do with a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// HTML page; its links are extracted and followed
    Document,
    /// Accepted file; handed to the download gate
    Downloadable,
    /// Anything else
    Ignored,
}

/// Returns true if the content type is one of the HTML forms
pub fn is_html(content_type: &str) -> bool {
    let mime_type = normalize_mime_type(content_type);
    HTML_MIME_TYPES.contains(&mime_type.as_str())
}

/// Classifies a content type against the accepted MIME types
///
/// HTML always wins, even when an HTML type is also accepted for download.
/// Parameters such as `charset` are ignored and the comparison is
/// case-insensitive; `accepted_types` is expected to be lowercased.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use sponge::crawler::{classify, Classification};
///
/// let accepted: HashSet<String> = ["application/pdf".to_string()].into();
///
/// assert_eq!(classify("text/html; charset=utf-8", &accepted), Classification::Document);
/// assert_eq!(classify("application/pdf", &accepted), Classification::Downloadable);
/// assert_eq!(classify("image/png", &accepted), Classification::Ignored);
/// ```
pub fn classify(content_type: &str, accepted_types: &HashSet<String>) -> Classification {
    let mime_type = normalize_mime_type(content_type);

    if HTML_MIME_TYPES.contains(&mime_type.as_str()) {
        Classification::Document
    } else if accepted_types.contains(&mime_type) {
        Classification::Downloadable
    } else {
        Classification::Ignored
    }
}

/// Classifies a fetched resource using both the accepted types and extensions
///
/// A resource the content type alone would ignore is still downloadable when
/// the extension of its last path segment is accepted.
pub fn classify_resource(
    content_type: &str,
    uri: &CanonicalUri,
    config: &CrawlConfig,
) -> Classification {
    match classify(content_type, &config.mime_types) {
        Classification::Ignored if has_accepted_extension(uri, &config.file_extensions) => {
            Classification::Downloadable
        }
        classification => classification,
    }
}

fn has_accepted_extension(uri: &CanonicalUri, accepted_extensions: &HashSet<String>) -> bool {
    uri.extension()
        .map(|extension| accepted_extensions.contains(&extension))
        .unwrap_or(false)
}
