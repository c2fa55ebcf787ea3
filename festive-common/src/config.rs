//! Service configuration
//!
//! Each setting is resolved independently, first match wins:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file (path from the command line or `FESTIVE_CONFIG`)
//! 4. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "FESTIVE_DB_PATH";
pub const ENV_BIND_ADDRESS: &str = "FESTIVE_BIND";
pub const ENV_CONFIG_FILE: &str = "FESTIVE_CONFIG";
/// Port-only override used by container platforms
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_DATABASE_PATH: &str = "festiveconnect.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_address: String,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub config_file: Option<PathBuf>,
}

/// Contents of the TOML config file; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the process environment and an optional file
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = overrides
            .config_file
            .clone()
            .or_else(|| env_value(ENV_CONFIG_FILE).map(PathBuf::from));

        let file = match config_path {
            Some(path) => ConfigFile::load(&path)?,
            None => ConfigFile::default(),
        };

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env_value(ENV_DATABASE_PATH).map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let bind_address = match overrides
            .bind_address
            .clone()
            .or_else(|| env_value(ENV_BIND_ADDRESS))
            .or(file.bind_address)
        {
            Some(address) => address,
            None => format!("{}:{}", DEFAULT_HOST, port_from_env()?),
        };

        Ok(Self {
            database_path,
            bind_address,
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn port_from_env() -> Result<u16> {
    match env_value(ENV_PORT) {
        Some(port) => port
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, port))),
        None => Ok(DEFAULT_PORT),
    }
}
