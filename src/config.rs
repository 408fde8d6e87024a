//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Environment variables
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auction: AuctionConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployed auction package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Package id of the auction deployment
    pub package_id: Option<String>,

    /// Module holding the auction entry functions
    #[serde(default = "default_module")]
    pub module: String,
}

/// Where saved RPC dumps are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory with `objects.json` and `transactions.json`
    pub dump_dir: Option<PathBuf>,

    /// Transactions requested per history page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable caching
    #[serde(default)]
    pub enabled: bool,

    /// Cache directory
    pub directory: Option<PathBuf>,

    /// Cache TTL
    #[serde(default = "default_cache_ttl")]
    pub ttl: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_module() -> String {
    crate::parser::DEFAULT_MODULE.to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            package_id: None,
            module: default_module(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dump_dir: None,
            page_size: default_page_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: None,
            ttl: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
            file: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./config.toml
    /// 2. ~/.sui-auction/config.toml
    /// 3. /etc/sui-auction/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("config.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".sui-auction").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/sui-auction/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Get the auction package id from config or environment
    pub fn package_id(&self) -> Result<String> {
        if let Some(id) = &self.auction.package_id {
            return Ok(id.clone());
        }

        std::env::var("AUCTION_PACKAGE_ID").map_err(|_| {
            Error::MissingConfig(
                "Auction package id not found. Set AUCTION_PACKAGE_ID environment variable or configure [auction] package_id".to_string(),
            )
        })
    }

    /// Get dump directory with fallback to the working directory
    pub fn dump_dir(&self) -> PathBuf {
        self.data
            .dump_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get cache directory with fallback to default
    pub fn cache_directory(&self) -> PathBuf {
        self.cache.directory.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".sui-auction").join("cache"))
                .unwrap_or_else(|| PathBuf::from("/tmp/sui-auction-cache"))
        })
    }
}
