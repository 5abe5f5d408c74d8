use crate::config::types::{CrawlerSettings, HttpSettings, Settings};
use crate::uri::canonicalize;
use crate::ConfigError;

/// Validates the merged settings before a crawl starts
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawler_settings(&settings.crawler)?;
    validate_http_settings(&settings.http)?;
    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(settings: &CrawlerSettings) -> Result<(), ConfigError> {
    match settings.uri.as_deref() {
        None | Some("") => {
            return Err(ConfigError::Validation("uri is required".to_string()));
        }
        Some(uri) => {
            canonicalize(uri)?;
        }
    }

    match settings.output.as_deref() {
        Some(output) if !output.as_os_str().is_empty() => {}
        _ => {
            return Err(ConfigError::Validation("output is required".to_string()));
        }
    }

    let has_mime_type = settings
        .mime_types
        .iter()
        .any(|mime_type| !normalize_mime_type(mime_type).is_empty());
    let has_extension = settings
        .file_extensions
        .iter()
        .any(|extension| !normalize_extension(extension).is_empty());

    if !has_mime_type && !has_extension {
        return Err(ConfigError::Validation(
            "at least one MIME type or file extension is required".to_string(),
        ));
    }

    // max_depth >= 0 is always true for u32, so no check needed

    if settings.max_uris < 1 {
        return Err(ConfigError::Validation(format!(
            "max_uris must be >= 1, got {}",
            settings.max_uris
        )));
    }

    if settings.concurrent_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrent_requests must be >= 1, got {}",
            settings.concurrent_requests
        )));
    }

    if settings.concurrent_downloads < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrent_downloads must be >= 1, got {}",
            settings.concurrent_downloads
        )));
    }

    Ok(())
}

/// Validates HTTP settings
fn validate_http_settings(settings: &HttpSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if settings.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            settings.timeout_secs
        )));
    }

    Ok(())
}

/// Lowercases a MIME type and drops any parameters
pub(crate) fn normalize_mime_type(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Lowercases a file extension and drops any leading "."
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
