use crate::uri::CanonicalUri;
use crate::UriError;
use percent_encoding::{percent_encode, AsciiSet, CONTROLS};
use url::Url;

const WWW_PREFIX: &str = "www.";

const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// Bytes escaped within a path segment
///
/// Unreserved characters, sub-delims, ':' and '@' are left as they are.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Canonicalizes raw link text into a [`CanonicalUri`]
///
/// # Canonicalization Steps
///
/// 1. Parse the URI; reject if malformed
/// 2. Reject any scheme other than http and https
/// 3. Reject an empty host
/// 4. Remove the www. prefix from the host
/// 5. Percent-escape every path segment independently. Segments are decoded
///    before being escaped again, so escaping an already escaped segment is a
///    no-op.
/// 6. Remove dot segments (. and ..)
/// 7. Keep the query string as it is
/// 8. Remove the fragment
///
/// # Examples
///
/// ```
/// use sponge::uri::canonicalize;
///
/// let uri = canonicalize("http://www.example.com/a/../my file.txt#part").unwrap();
/// assert_eq!(uri.as_str(), "http://example.com/my%20file.txt");
/// ```
pub fn canonicalize(raw: &str) -> Result<CanonicalUri, UriError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UriError::Parse(format!("{}: {}", raw, e)))?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(UriError::UnsupportedScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(UriError::MissingHost),
    };

    if let Some(stripped) = host.strip_prefix(WWW_PREFIX) {
        if stripped.is_empty() {
            return Err(UriError::MissingHost);
        }

        url.set_host(Some(stripped))
            .map_err(|e| UriError::Malformed(format!("Failed to set host {}: {}", stripped, e)))?;
    }

    // set_path resolves any dot segments the escaping step exposes
    let escaped = escape_path(url.path());
    url.set_path(&escaped);

    url.set_fragment(None);

    Ok(CanonicalUri::from_normalized(url))
}

fn escape_path(path: &str) -> String {
    path.split('/')
        .map(escape_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn escape_segment(segment: &str) -> String {
    let decoded = urlencoding::decode_binary(segment.as_bytes());
    percent_encode(&decoded, PATH_SEGMENT).to_string()
}
