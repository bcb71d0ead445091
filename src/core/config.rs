//! Coordinator configuration (JSON file, every field optional)
//!
//! ```json
//! {
//!   "components": [{ "id": "quantum" }, { "id": "ai", "level": 0.5 }],
//!   "strategy": "balanced",
//!   "audit_capacity": 128
//! }
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::{BASELINE, DEFAULT_AUDIT_CAPACITY, DEFAULT_COMPONENTS};
use crate::types::AggregationStrategy;

/// Errors while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A component to register at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub id: String,
    /// Initial level; the baseline when omitted
    #[serde(default = "baseline")]
    pub level: f64,
}

fn baseline() -> f64 {
    BASELINE
}

/// Startup configuration for a coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub components: Vec<ComponentConfig>,
    pub strategy: AggregationStrategy,
    pub audit_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            components: DEFAULT_COMPONENTS
                .iter()
                .map(|id| ComponentConfig {
                    id: id.to_string(),
                    level: BASELINE,
                })
                .collect(),
            strategy: AggregationStrategy::default(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
        }
    }
}

impl CoordinatorConfig {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load a file if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
