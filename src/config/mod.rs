//! Configuration module for propbind-rs
//!
//! A [`BindingConfig`] groups the scheduler settings and the default tween
//! settings handed to tween stages that don't bring their own. It is loaded
//! once at start-up; pipeline definitions themselves are not persisted.
//!
//! # Formats
//!
//! - `.toml` files are read and written as TOML
//! - anything else is JSON (the primary format)
//!
//! # Example
//!
//! ```ignore
//! use propbind_rs::config::BindingConfig;
//!
//! let config = BindingConfig::load_or_default("bindings.json");
//! let scheduler = Scheduler::new(config.scheduler.clone());
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{BindError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Scheduler timing settings
    pub scheduler: SchedulerSettings,

    /// Default settings for tween stages
    pub tween: TweenSettings,
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

impl BindingConfig {
    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BindError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content).map_err(|e| {
                BindError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                BindError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, returning defaults if any error occurs
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Save the configuration to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BindError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| BindError::Serialization(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| BindError::Serialization(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            BindError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate().map_err(BindError::Config)?;
        self.tween
            .validate()
            .map_err(|(param, msg)| BindError::Config(format!("tween.{}: {}", param, msg)))
    }
}
