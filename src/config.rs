//! Broker configuration.
//!
//! Configuration lives in the user config directory (`$ENCHANT_CONFIG_DIR`, or
//! `<platform config dir>/enchant`). An optional `broker.json` describes the
//! word-list engines; an optional `enchant.ordering` file holds
//! `tag:provider,provider` lines applied to every new broker.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the user config directory
pub const CONFIG_DIR_ENV: &str = "ENCHANT_CONFIG_DIR";

/// Name of the JSON configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "broker.json";

/// Name of the provider ordering file inside the config directory
pub const ORDERING_FILE_NAME: &str = "enchant.ordering";

/// Engine name used when no configuration file is present
pub const DEFAULT_ENGINE_NAME: &str = "wordlist";

/// Error types for configuration loading
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The platform has no config directory and none was given
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// Failed to read a configuration file
    #[error("Failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
    /// Failed to parse the configuration file
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// One word-list engine: a named provider backend with a dictionary directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Provider identifier used in orderings (e.g., "wordlist")
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Directory holding `<tag>.dic` word lists
    pub dictionary_dir: PathBuf,
}

/// Top-level broker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrokerConfig {
    /// Directory for personal word lists, exclude lists and the ordering file
    pub user_config_dir: PathBuf,
    /// Engines in default priority order
    #[serde(default)]
    pub engines: Vec<EngineConfig>,
    /// Initial value of the broker's dictionary cache flag
    #[serde(default = "default_cache_dictionaries")]
    pub cache_dictionaries: bool,
}

fn default_cache_dictionaries() -> bool {
    true
}

impl BrokerConfig {
    /// Default configuration rooted at `user_config_dir`: a single engine
    /// reading `<user_config_dir>/dictionaries`.
    pub fn with_user_config_dir(user_config_dir: PathBuf) -> Self {
        let engine = EngineConfig {
            name: DEFAULT_ENGINE_NAME.to_string(),
            description: "Plain word list dictionaries".to_string(),
            dictionary_dir: user_config_dir.join("dictionaries"),
        };
        Self {
            user_config_dir,
            engines: vec![engine],
            cache_dictionaries: true,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// A relative `userConfigDir` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        crate::debug!("Loading broker config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config: BrokerConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if let Some(base) = path.parent() {
            if config.user_config_dir.is_relative() {
                config.user_config_dir = base.join(&config.user_config_dir);
            }
            for engine in &mut config.engines {
                if engine.dictionary_dir.is_relative() {
                    engine.dictionary_dir = base.join(&engine.dictionary_dir);
                }
            }
        }

        crate::info!("Loaded broker config with {} engines", config.engines.len());
        Ok(config)
    }

    /// Discover configuration from the environment.
    ///
    /// Uses `broker.json` in the user config directory when present,
    /// otherwise the defaults for that directory.
    pub fn discover() -> Result<Self, ConfigError> {
        let dir = user_config_dir()?;
        let file = dir.join(CONFIG_FILE_NAME);
        if file.exists() {
            Self::load(&file)
        } else {
            crate::debug!("No broker config at {:?}, using defaults", file);
            Ok(Self::with_user_config_dir(dir))
        }
    }

    /// Path of the provider ordering file
    pub fn ordering_file(&self) -> PathBuf {
        self.user_config_dir.join(ORDERING_FILE_NAME)
    }

    /// Read the ordering file, if any.
    ///
    /// A missing or unreadable file yields no orderings.
    pub fn load_orderings(&self) -> Vec<(String, String)> {
        match fs::read_to_string(self.ordering_file()) {
            Ok(content) => parse_orderings(&content),
            Err(_) => Vec::new(),
        }
    }
}

/// Resolve the user config directory: `$ENCHANT_CONFIG_DIR`, else
/// `<platform config dir>/enchant`.
pub fn user_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("enchant"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Parse `tag:ordering` lines. Lines without a colon are ignored.
pub fn parse_orderings(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let (tag, ordering) = line.split_once(':')?;
            Some((tag.to_string(), ordering.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
