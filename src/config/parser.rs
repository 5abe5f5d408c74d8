use crate::config::types::{CrawlConfig, Settings};
use crate::ConfigError;
use std::path::Path;

/// Loads settings from a TOML file without validating them
///
/// Settings loaded this way may still be completed from the command line, so
/// validation happens when they are turned into a [`CrawlConfig`].
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully parsed settings
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

/// Loads, validates and converts a TOML file into a [`CrawlConfig`]
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sponge::config::load_config;
///
/// let config = load_config(Path::new("sponge.toml")).unwrap();
/// println!("Max depth: {}", config.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    CrawlConfig::try_from(load_settings(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CONCURRENT_REQUESTS, DEFAULT_MAX_URIS, DEFAULT_TIMEOUT_SECS};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
uri = "https://www.example.com/docs/"
output = "./downloads"
mime-types = ["Application/PDF", "text/plain"]
file-extensions = [".zip"]
max-depth = 3
max-uris = 500
include-subdomains = true
concurrent-requests = 8
concurrent-downloads = 2

[http]
user-agent = "TestBot/1.0"
timeout-secs = 30
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.root.as_str(), "https://example.com/docs/");
        assert_eq!(config.output_dir, Path::new("./downloads"));
        assert!(config.mime_types.contains("application/pdf"));
        assert!(config.mime_types.contains("text/plain"));
        assert!(config.file_extensions.contains("zip"));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_uris, 500);
        assert!(config.include_subdomains);
        assert_eq!(config.concurrent_requests, 8);
        assert_eq!(config.concurrent_downloads, 2);
        assert_eq!(config.http.user_agent, "TestBot/1.0");
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_defaults_apply() {
        let config_content = r#"
[crawler]
uri = "https://example.com"
output = "./downloads"
mime-types = ["text/plain"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.max_depth, 1);
        assert_eq!(config.max_uris, DEFAULT_MAX_URIS);
        assert!(!config.include_subdomains);
        assert_eq!(config.concurrent_requests, DEFAULT_CONCURRENT_REQUESTS);
        assert_eq!(config.http.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.http.user_agent.starts_with("sponge/"));
    }

    #[test]
    fn test_load_settings_allows_partial_file() {
        let file = create_temp_config("[http]\ntimeout-secs = 5\n");
        let settings = load_settings(file.path()).unwrap();

        assert!(settings.crawler.uri.is_none());
        assert_eq!(settings.http.timeout_secs, 5);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/sponge.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
uri = "https://example.com"
output = "./downloads"
mime-types = ["text/plain"]
concurrent-requests = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_config_with_invalid_root() {
        let config_content = r#"
[crawler]
uri = "file:///etc/passwd"
output = "./downloads"
mime-types = ["text/plain"]
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidUri(_))));
    }
}
