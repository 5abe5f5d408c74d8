use crate::config::CrawlConfig;
use crate::uri::CanonicalUri;

/// Checks whether a discovered URI stays inside the crawl's host scope
///
/// The candidate is in scope when its host equals the root host, or when
/// subdomains are included and its host ends with "." followed by the root
/// host. Both hosts are already stripped of "www." by canonicalization.
pub fn has_valid_host(candidate: &CanonicalUri, config: &CrawlConfig) -> bool {
    host_in_scope(candidate.host(), config.root.host(), config.include_subdomains)
}

/// Host comparison behind [`has_valid_host`]
///
/// # Examples
///
/// ```
/// use sponge::uri::host_in_scope;
///
/// assert!(host_in_scope("example.com", "example.com", false));
/// assert!(!host_in_scope("blog.example.com", "example.com", false));
/// assert!(host_in_scope("blog.example.com", "example.com", true));
/// assert!(!host_in_scope("notexample.com", "example.com", true));
/// ```
pub fn host_in_scope(candidate: &str, root: &str, include_subdomains: bool) -> bool {
    if candidate == root {
        return true;
    }

    include_subdomains
        && candidate.len() > root.len()
        && candidate.ends_with(root)
        && candidate[..candidate.len() - root.len()].ends_with('.')
}
