//! Database location resolution.
//!
//! The store path is taken from, in order: the `--database` flag, the
//! `CMSMOD_DATABASE` environment variable, the `database` key of
//! `<config dir>/cmsmod/config.json`, and finally `cmsmod.db` in the platform
//! data directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "cmsmod";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "cmsmod.db";

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "CMSMOD_DATABASE";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite store
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let loaded = get_config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Pick the database path by precedence: flag, environment, config file, default.
    pub fn resolve_database_path(
        &self,
        flag: Option<PathBuf>,
        env: Option<PathBuf>,
    ) -> Result<PathBuf> {
        if let Some(path) = flag.or(env).or_else(|| self.database.clone()) {
            return Ok(path);
        }
        default_database_path()
    }
}

/// Read the database override from the environment, ignoring empty values.
pub fn database_from_env() -> Option<PathBuf> {
    std::env::var_os(DATABASE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub fn default_database_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join(DATABASE_FILE))
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
