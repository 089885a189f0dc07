//! TOML configuration file loading
//!
//! Supports `~/.config/azkaban/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Default Azkaban host (e.g. `https://azkaban.internal:8443`)
    #[serde(default)]
    pub host: Option<String>,

    /// Default user for `login`
    #[serde(default)]
    pub user: Option<String>,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpFileConfig,

    /// Directory where project archives are written before upload
    #[serde(default)]
    pub archive_dir: Option<String>,

    /// Where the logged session is kept between invocations
    #[serde(default)]
    pub session_file: Option<String>,
}

/// HTTP client configuration
#[derive(Debug, Default, Deserialize)]
pub struct HttpFileConfig {
    /// Skip TLS certificate verification (self-signed servers)
    pub accept_invalid_certs: Option<bool>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Load the TOML config file from `path`
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/azkaban/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("azkaban").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let fc = load_config_file(&dir.path().join("absent.toml"));
        assert!(fc.host.is_none());
        assert!(fc.http.accept_invalid_certs.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
host = "https://azkaban.example:8443/"
user = "etl"
archive_dir = "/var/tmp"

[http]
accept_invalid_certs = false
timeout_secs = 20
"#,
        )
        .unwrap();

        let fc = load_config_file(&path);
        assert_eq!(fc.host.as_deref(), Some("https://azkaban.example:8443/"));
        assert_eq!(fc.user.as_deref(), Some("etl"));
        assert_eq!(fc.archive_dir.as_deref(), Some("/var/tmp"));
        assert_eq!(fc.http.accept_invalid_certs, Some(false));
        assert_eq!(fc.http.timeout_secs, Some(20));
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = [not toml").unwrap();

        let fc = load_config_file(&path);
        assert!(fc.host.is_none());
    }
}
