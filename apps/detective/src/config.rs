//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. TOML file (`--config`, else `detective.toml` when present)
//! 3. environment (`DETECTIVE_API_URL`, `DETECTIVE_STATE_PATH`,
//!    `DETECTIVE_TIMEOUT_SECS`)
//! 4. command-line flags
//!
//! Environment and flags reach this module together as [`ConfigOverrides`]
//! (clap reads the variables).

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "detective.toml";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STATE_PATH: &str = "detective.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the backend REST API.
    pub api_url: String,
    /// redb file holding game, auth, board and chat state.
    pub state_path: PathBuf,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Values from the environment or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub state_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ApiError> {
        toml::from_str(source).map_err(|e| ApiError::Config(e.to_string()))
    }

    /// Read the configuration file.
    ///
    /// An explicit path must exist. Without one, `detective.toml` is used
    /// when present and the defaults otherwise.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ApiError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let source = std::fs::read_to_string(&path)
            .map_err(|e| ApiError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply environment/flag values on top.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if let Some(state_path) = overrides.state_path {
            self.state_path = state_path;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    /// Full resolution: file, then overrides, then validation.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ApiError> {
        let config = Self::from_file(path)?.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "api_url must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
