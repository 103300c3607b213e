//! Configuration Module
//!
//! Handles loading the cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Bytes per megabyte used for size limits and statistics.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the `cache.db` store
    pub cache_directory: PathBuf,
    /// Maximum total payload size in megabytes
    pub max_size_mb: u64,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: i64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweep task
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DIR` - Cache directory (default: `.cache/ollama`)
    /// - `CACHE_MAX_SIZE_MB` - Maximum cache size in MB (default: 100)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_directory: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_directory),
            max_size_mb: parse_var("CACHE_MAX_SIZE_MB").unwrap_or(defaults.max_size_mb),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Maximum total payload size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from(".cache/ollama"),
            max_size_mb: 100,
            default_ttl: 3600,
            server_port: 3000,
            cleanup_interval: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_directory, PathBuf::from(".cache/ollama"));
        assert_eq!(config.max_size_mb, 100);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 0);
    }

    #[test]
    fn test_max_size_bytes() {
        let config = Config {
            max_size_mb: 2,
            ..Config::default()
        };
        assert_eq!(config.max_size_bytes(), 2 * 1024 * 1024);
    }

    // Single test touching the environment so parallel tests don't race on it.
    #[test]
    fn test_config_from_env() {
        env::remove_var("CACHE_DIR");
        env::remove_var("CACHE_MAX_SIZE_MB");
        env::remove_var("CACHE_DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.cache_directory, PathBuf::from(".cache/ollama"));
        assert_eq!(config.max_size_mb, 100);
        assert_eq!(config.default_ttl, 3600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 0);

        env::set_var("CACHE_MAX_SIZE_MB", "5");
        env::set_var("CACHE_DEFAULT_TTL", "not-a-number");
        let config = Config::from_env();
        assert_eq!(config.max_size_mb, 5);
        assert_eq!(config.default_ttl, 3600);

        env::remove_var("CACHE_MAX_SIZE_MB");
        env::remove_var("CACHE_DEFAULT_TTL");
    }
}
