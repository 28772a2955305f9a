//! Simulator configuration.
//!
//! Read from a JSON file; every field is optional:
//!
//! ```json
//! { "step_interval_ms": 100, "max_steps": 500, "default_library": "Logic" }
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::registry::Registry;

/// Runtime settings shared by the CLI and the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Period of the automatic step driver.
    pub step_interval_ms: u64,
    /// Steps executed by `run` when no count is given.
    pub max_steps: u64,
    /// Library made current after the built-ins are registered.
    pub default_library: Option<String>,
    /// Print every step's values while running.
    pub trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: 250,
            max_steps: 100,
            default_library: None,
            trace: false,
        }
    }
}

/// Errors reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("step interval must be at least 1 ms")]
    ZeroInterval,
}

impl SimConfig {
    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        if config.step_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(config)
    }

    /// Built-in registry with [`SimConfig::default_library`] made current.
    ///
    /// An unknown default library is logged and the built-in default kept.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::with_builtins();
        if let Some(name) = &self.default_library {
            if let Err(e) = registry.set_current(name) {
                log::warn!("default library ignored: {}", e);
            }
        }
        registry
    }
}
