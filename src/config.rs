//! Configuration and credential loading for qalam.
//!
//! Settings come from an optional TOML file, then environment overrides.
//! The API key is required and resolved separately so that a missing key
//! stops the program before any pipeline run is attempted.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::llm::LlmConfig;
use crate::models::DEFAULT_MAX_IMAGE_BYTES;
use crate::utils::redact;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not set. Set GEMINI_API_KEY (or API_KEY), or pass --api-key")]
    MissingApiKey,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// The credential for the remote capabilities. Never empty.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting empty or whitespace-only values.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(key))
    }

    /// Resolve the key from an explicit value or the environment.
    ///
    /// A blank explicit value falls through to the environment.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit.filter(|key| !key.trim().is_empty()) {
            Some(key) => Self::new(key),
            None => Self::from_lookup(|name| std::env::var(name).ok()),
        }
    }

    /// Resolve the key from the first non-empty variable in [`API_KEY_VARS`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        API_KEY_VARS
            .iter()
            .filter_map(|&name| lookup(name))
            .find_map(|value| Self::new(value).ok())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", redact(&self.0))
    }
}

/// Input handling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Advisory size limit; larger images are processed with a warning.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_max_image_bytes() -> u64 {
    DEFAULT_MAX_IMAGE_BYTES
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub input: InputConfig,
}

impl Settings {
    /// Default config file location (`<config dir>/qalam/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qalam").join("config.toml"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used if present and defaults otherwise. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        Ok(settings.with_env_overrides())
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();
        self
    }
}
