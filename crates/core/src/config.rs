//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default and a missing file
//! means "all defaults".

use crate::error::ConfigError;
use crate::scale::{ScaleSpec, DEFAULT_SCALE_LABEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings a takeoff session starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scale label applied until the user picks one
    pub default_scale: String,
    /// Page new takeoffs are drawn on
    pub page_index: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_scale: DEFAULT_SCALE_LABEL.to_string(),
            page_index: 0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `path`, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let bytes = fs::read(path)?;
        let config = serde_json::from_slice(&bytes)?;
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Parsed default scale
    pub fn scale(&self) -> ScaleSpec {
        ScaleSpec::parse(&self.default_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("nested").join("takeoff.json");

        let config = EngineConfig {
            default_scale: "1/4\" = 1'".to_string(),
            page_index: 3,
        };
        config.save(&path).expect("save should succeed");

        let loaded = EngineConfig::load(&path).expect("load should succeed");
        assert_eq!(loaded, config);
        assert_eq!(loaded.scale().inches_per_foot(), 0.25);
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let loaded = EngineConfig::load(&temp.path().join("missing.json"))
            .expect("load should succeed");
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("takeoff.json");
        fs::write(&path, br#"{ "page_index": 2 }"#).expect("write should succeed");

        let loaded = EngineConfig::load(&path).expect("load should succeed");
        assert_eq!(loaded.page_index, 2);
        assert_eq!(loaded.default_scale, DEFAULT_SCALE_LABEL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("takeoff.json");
        fs::write(&path, b"not json").expect("write should succeed");

        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Json(_))
        ));
    }
}
