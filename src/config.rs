//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which key-value store the cache talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Networked Redis server
    Redis,
    /// In-process store, for running without Redis
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store backend selection
    pub store_backend: BackendKind,
    /// Redis connection address
    pub redis_url: String,
    /// TTL in seconds for composite dashboard responses
    pub default_ttl: u64,
    /// TTL in seconds for individual component results
    pub component_ttl: u64,
    /// Connect and per-command timeout in seconds
    pub store_timeout: u64,
    /// Interval in seconds between store health pings
    pub health_check_interval: u64,
    /// Upper bound in seconds on a whole warming run
    pub warm_timeout: u64,
    /// Capacity of the in-process store
    pub max_entries: usize,
    /// Interval in seconds between expiry sweeps of the in-process store
    pub cleanup_interval: u64,
    /// Directory holding pre-aggregated product documents
    pub data_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_URL` - Store address (default: redis://localhost:6379)
    /// - `DEFAULT_TTL` - Composite TTL in seconds (default: 600)
    /// - `COMPONENT_TTL` - Component TTL in seconds (default: 1800)
    /// - `STORE_TIMEOUT` - Connect/command timeout in seconds (default: 5)
    /// - `HEALTH_CHECK_INTERVAL` - Ping interval in seconds (default: 30)
    /// - `WARM_TIMEOUT` - Warming bound in seconds (default: 60)
    /// - `MAX_ENTRIES` - In-process store capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - In-process sweep frequency in seconds (default: 1)
    /// - `DATA_DIR` - Product document directory (default: ./data)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_backend: env_or("STORE_BACKEND", defaults.store_backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            component_ttl: env_or("COMPONENT_TTL", defaults.component_ttl),
            store_timeout: env_or("STORE_TIMEOUT", defaults.store_timeout),
            health_check_interval: env_or(
                "HEALTH_CHECK_INTERVAL",
                defaults.health_check_interval,
            ),
            warm_timeout: env_or("WARM_TIMEOUT", defaults.warm_timeout),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Composite response TTL.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Component result TTL.
    pub fn component_ttl(&self) -> Duration {
        Duration::from_secs(self.component_ttl)
    }

    /// Store connect and command timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout)
    }

    /// Bound on a whole warming fan-out.
    pub fn warm_timeout(&self) -> Duration {
        Duration::from_secs(self.warm_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_backend: BackendKind::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            default_ttl: 600,
            component_ttl: 1800,
            store_timeout: 5,
            health_check_interval: 30,
            warm_timeout: 60,
            max_entries: 10_000,
            cleanup_interval: 1,
            data_dir: PathBuf::from("./data"),
            server_port: 8000,
        }
    }
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.store_backend, BackendKind::Redis);
        assert_eq!(config.default_ttl, 600);
        assert_eq!(config.component_ttl, 1800);
        assert_eq!(config.store_timeout, 5);
        assert_eq!(config.health_check_interval, 30);
        assert_eq!(config.server_port, 8000);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("STORE_BACKEND");
        env::remove_var("DEFAULT_TTL");
        env::remove_var("COMPONENT_TTL");
        env::remove_var("SERVER_PORT");

        let config = Config::from_env();
        assert_eq!(config.store_backend, BackendKind::Redis);
        assert_eq!(config.default_ttl(), Duration::from_secs(600));
        assert_eq!(config.component_ttl(), Duration::from_secs(1800));
        assert_eq!(config.server_port, 8000);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("redis".parse::<BackendKind>(), Ok(BackendKind::Redis));
        assert_eq!(" Memory ".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert!("memcached".parse::<BackendKind>().is_err());
    }
}
