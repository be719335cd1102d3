//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling on nested prog invocations.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Invocation depth beyond which a call chain is aborted.
    pub max_recursion_depth: usize,
    /// Log compile failures at `warn` in addition to returning them.
    pub log_compile_failures: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            log_compile_failures: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_recursion_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_recursion_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_recursion_depth, 250);
        assert!(config.log_compile_failures);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "log_compile_failures": false }"#).unwrap();
        assert_eq!(config.max_recursion_depth, 250);
        assert!(!config.log_compile_failures);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(EngineConfig::from_json_str(r#"{ "max_recursion_depth": 0 }"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "max_recursion_depth": 16 }"#).unwrap();
        assert_eq!(EngineConfig::from_json_file(&path).unwrap().max_recursion_depth, 16);
    }
}
