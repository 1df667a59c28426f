//! Configuration loading for LexiPath services
//!
//! Settings resolve in priority order:
//! 1. Environment variable (highest)
//! 2. TOML config file (`LEXIPATH_CONFIG` or `lexipath.toml` in the working directory)
//! 3. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PORT: u16 = 5810;
const DEFAULT_DATABASE_PATH: &str = "lexipath.db";
const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";
const DEFAULT_ML_TIMEOUT_SECONDS: u64 = 15;
const DEFAULT_MEDIA_DIR: &str = "media";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:5810";

/// Raw TOML file contents (all keys optional)
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    port: Option<u16>,
    database_path: Option<String>,
    ml_service_url: Option<String>,
    ml_timeout_seconds: Option<u64>,
    media_dir: Option<String>,
    public_base_url: Option<String>,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Base URL of the external ML scoring service
    pub ml_service_url: String,
    /// Bounded timeout for a single scorer call
    pub ml_timeout: Duration,
    /// Directory for stored media blobs (audio recordings)
    pub media_dir: PathBuf,
    /// Public base URL used to absolutize relative media references
    pub public_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            ml_service_url: DEFAULT_ML_SERVICE_URL.to_string(),
            ml_timeout: Duration::from_secs(DEFAULT_ML_TIMEOUT_SECONDS),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration with env → TOML → default priority
    pub fn load() -> Result<Self> {
        let toml_config = load_toml_config()?;
        Ok(Self::resolve(toml_config))
    }

    /// Load configuration from an explicit TOML file (test surface)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let toml_config: TomlConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(Self::resolve(toml_config))
    }

    fn resolve(toml_config: TomlConfig) -> Self {
        let defaults = Self::default();

        let port = env_var("LEXIPATH_PORT")
            .and_then(|v| v.parse().ok())
            .or(toml_config.port)
            .unwrap_or(defaults.port);

        let database_path = env_var("LEXIPATH_DB")
            .or(toml_config.database_path)
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let ml_service_url = env_var("LEXIPATH_ML_URL")
            .or(toml_config.ml_service_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.ml_service_url);

        let ml_timeout = env_var("LEXIPATH_ML_TIMEOUT_SECONDS")
            .and_then(|v| v.parse().ok())
            .or(toml_config.ml_timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(defaults.ml_timeout);

        let media_dir = env_var("LEXIPATH_MEDIA_DIR")
            .or(toml_config.media_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.media_dir);

        let public_base_url = env_var("LEXIPATH_PUBLIC_URL")
            .or(toml_config.public_base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_base_url);

        Self {
            port,
            database_path,
            ml_service_url,
            ml_timeout,
            media_dir,
            public_base_url,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Locate and parse the TOML config file, if any
fn load_toml_config() -> Result<TomlConfig> {
    let path = match env_var("LEXIPATH_CONFIG") {
        Some(explicit) => {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(Error::Config(format!(
                    "LEXIPATH_CONFIG points to missing file: {}",
                    path.display()
                )));
            }
            path
        }
        None => {
            let default_path = PathBuf::from("lexipath.toml");
            if !default_path.exists() {
                return Ok(TomlConfig::default());
            }
            default_path
        }
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.ml_service_url, DEFAULT_ML_SERVICE_URL);
        assert_eq!(config.ml_timeout, Duration::from_secs(DEFAULT_ML_TIMEOUT_SECONDS));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 6001
ml_service_url = "http://scorer.internal:9000/"
ml_timeout_seconds = 3
"#
        )
        .unwrap();

        let config = ServiceConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.port, 6001);
        // Trailing slash is trimmed so URL joining stays predictable
        assert_eq!(config.ml_service_url, "http://scorer.internal:9000");
        assert_eq!(config.ml_timeout, Duration::from_secs(3));
        // Unset keys fall back to defaults
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number").unwrap();

        let result = ServiceConfig::load_from_file(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
