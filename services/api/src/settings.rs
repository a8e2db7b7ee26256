//! Runtime settings for the API service

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;

/// API service configuration
///
/// Loaded from `MOVIEFLIX_*` environment variables, e.g. `MOVIEFLIX_POSTER_DIR`,
/// `MOVIEFLIX_BASE_URL`, `MOVIEFLIX_BIND_ADDR`, `MOVIEFLIX_MAX_UPLOAD_BYTES`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,
    /// Directory poster images are stored in
    pub poster_dir: PathBuf,
    /// Public origin used to build poster URLs
    pub base_url: String,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("poster_dir", "posters")?
            .set_default("base_url", "http://localhost:3001")?
            .set_default("max_upload_bytes", 10_i64 * 1024 * 1024)?
            .add_source(Environment::with_prefix("MOVIEFLIX").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "MOVIEFLIX_BIND_ADDR",
        "MOVIEFLIX_POSTER_DIR",
        "MOVIEFLIX_BASE_URL",
        "MOVIEFLIX_MAX_UPLOAD_BYTES",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_environment() {
        clear_env();

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.poster_dir, PathBuf::from("posters"));
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn environment_overrides_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("MOVIEFLIX_POSTER_DIR", "/var/lib/movieflix/posters");
            std::env::set_var("MOVIEFLIX_BASE_URL", "https://cdn.example.com");
            std::env::set_var("MOVIEFLIX_MAX_UPLOAD_BYTES", "1024");
        }

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(
            config.poster_dir,
            PathBuf::from("/var/lib/movieflix/posters")
        );
        assert_eq!(config.base_url, "https://cdn.example.com");
        assert_eq!(config.max_upload_bytes, 1024);

        clear_env();
    }
}
