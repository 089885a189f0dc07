//! Configuration management for the Azkaban client

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

/// HTTP client settings, scoped to one client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Skip TLS certificate verification
    ///
    /// Defaults to `true`: Azkaban deployments commonly run with self-signed
    /// certificates.
    pub accept_invalid_certs: bool,

    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            timeout: None,
        }
    }
}

/// Azkaban client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Default host for `login`
    pub host: Option<String>,

    /// Default user for `login`
    pub user: Option<String>,

    /// HTTP client settings
    pub client: ClientConfig,

    /// Directory where project archives are written before upload
    pub archive_dir: PathBuf,

    /// Session store location
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// Priority: env > toml > default. `AZKABAN_CONFIG` overrides the config
    /// file location.
    ///
    /// # Errors
    ///
    /// Returns error if an environment override cannot be parsed
    pub fn load() -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();

        let path = env("AZKABAN_CONFIG")
            .map(PathBuf::from)
            .or_else(file::config_file_path);
        let fc = path
            .as_deref()
            .map(file::load_config_file)
            .unwrap_or_default();

        Self::from_sources(fc, env)
    }

    /// Merge a parsed config file with environment lookups
    ///
    /// # Errors
    ///
    /// Returns error if a boolean or numeric override cannot be parsed
    pub fn from_sources(
        fc: file::ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let accept_invalid_certs = match env("AZKABAN_ACCEPT_INVALID_CERTS") {
            Some(v) => parse_bool("AZKABAN_ACCEPT_INVALID_CERTS", &v)?,
            None => fc.http.accept_invalid_certs.unwrap_or(true),
        };

        let timeout_secs = match env("AZKABAN_TIMEOUT_SECS") {
            Some(v) => Some(v.parse::<u64>().map_err(|e| {
                Error::Config(format!("AZKABAN_TIMEOUT_SECS must be a number: {e}"))
            })?),
            None => fc.http.timeout_secs,
        };

        let archive_dir = env("AZKABAN_ARCHIVE_DIR")
            .or(fc.archive_dir)
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        let session_file = env("AZKABAN_SESSION_FILE")
            .or(fc.session_file)
            .map(PathBuf::from)
            .or_else(crate::session_store::default_session_path)
            .unwrap_or_else(|| PathBuf::from(".azkaban_session.json"));

        Ok(Self {
            host: env("AZKABAN_HOST").or(fc.host),
            user: env("AZKABAN_USER").or(fc.user),
            client: ClientConfig {
                accept_invalid_certs,
                timeout: timeout_secs.map(Duration::from_secs),
            },
            archive_dir,
            session_file,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!("{key} must be a boolean, got `{other}`"))),
    }
}
