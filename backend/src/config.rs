//! Configuration management for the Farm Monitoring Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FMP_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Analytics provider configuration
    pub provider: ProviderConfig,

    /// Analytics cache configuration
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Analytics provider base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Additional attempts after a failed transport (provider-reported
    /// errors are never retried)
    pub max_retries: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Path of the persisted cache blob
    pub path: String,

    /// Optional entry lifetime in seconds. Unset means entries never
    /// expire, matching the default freshness policy.
    pub ttl_seconds: Option<u64>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FMP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 4000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("provider.base_url", "http://localhost:5005")?
            .set_default("provider.timeout_seconds", 120)?
            .set_default("provider.max_retries", 1)?
            .set_default("cache.path", "analytics_cache.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FMP_ prefix)
            .add_source(
                Environment::with_prefix("FMP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            host: "0.0.0.0".to_string(),
        }
    }
}
