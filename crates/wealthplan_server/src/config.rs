//! Server configuration
//!
//! Values come from three layers: built-in defaults, an optional YAML file
//! and command-line flags, each overriding the one before.

use std::path::Path;

use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};
use wealthplan_core::EngineDefaults;

fn default_bind() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_database() -> String {
    "wealthplan.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// SQLite file path, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Assumptions applied when a request leaves a parameter out
    #[serde(default)]
    pub defaults: EngineDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database: default_database(),
            log_level: default_log_level(),
            defaults: EngineDefaults::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    /// Read `path` if given, otherwise fall back to the built-in defaults
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Self::from_yaml(&content)
                    .map_err(|e| eyre!("invalid config {}: {e}", path.display()))?
            }
            None => Self::default(),
        };
        config
            .defaults
            .validate()
            .map_err(|e| eyre!("invalid engine defaults: {e}"))?;
        Ok(config)
    }
}
