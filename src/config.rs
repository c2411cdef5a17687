// src/config.rs

//! Manages server configuration: loading from TOML and validation.

use crate::core::cache::DEFAULT_CACHE_CAPACITY;
use crate::core::store::{NEW_ACCOUNT_CREDIT_MAX, NEW_ACCOUNT_CREDIT_MIN};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;

/// The validated server configuration. Every field has a default, so an
/// absent config file yields a fully usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upper bound on simultaneous client connections.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Number of accounts held in the in-memory cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Path of the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Inclusive range the starting balance of a new account is drawn from.
    #[serde(default = "default_credit_min")]
    pub starting_credit_min: i64,
    #[serde(default = "default_credit_max")]
    pub starting_credit_max: i64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8808
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_clients() -> usize {
    50
}
fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}
fn default_db_path() -> String {
    "game.db".to_string()
}
fn default_credit_min() -> i64 {
    NEW_ACCOUNT_CREDIT_MIN
}
fn default_credit_max() -> i64 {
    NEW_ACCOUNT_CREDIT_MAX
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_clients: default_max_clients(),
            cache_capacity: default_cache_capacity(),
            db_path: default_db_path(),
            starting_credit_min: default_credit_min(),
            starting_credit_max: default_credit_max(),
        }
    }
}

impl Config {
    /// Loads and validates the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.starting_credit_min < 0 {
            return Err(anyhow!("starting_credit_min must not be negative"));
        }
        if self.starting_credit_min > self.starting_credit_max {
            return Err(anyhow!(
                "starting_credit_min ({}) must not exceed starting_credit_max ({})",
                self.starting_credit_min,
                self.starting_credit_max
            ));
        }
        if self.max_clients == 0 {
            return Err(anyhow!("max_clients must be at least 1"));
        }
        Ok(())
    }
}
