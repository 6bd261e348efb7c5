//! Interpreter configuration, optionally read from a TOML file.
//!
//! ```toml
//! max_stack_depth = 4096
//! max_call_depth = 512
//! entry = "main"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for '{field}' in {path}: {reason}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: &'static str,
    },
}

/// Interpreter configuration options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    /// Maximum number of values on the data stack.
    pub max_stack_depth: usize,
    /// Maximum nesting of function calls.
    pub max_call_depth: usize,
    /// Global run by the command line when no entry is given.
    pub entry: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: 1024,
            max_call_depth: 256,
            entry: "main".to_string(),
        }
    }
}

impl InterpreterConfig {
    /// Load a configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_str(&content, path)
    }

    /// Parse a configuration that did not come from a file.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_str(content, Path::new("<inline>"))
    }

    /// Parse a configuration from a string.
    pub fn from_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: InterpreterConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field, reason| ConfigError::Invalid {
            path: path.to_owned(),
            field,
            reason,
        };
        if self.max_stack_depth == 0 {
            return Err(invalid("max_stack_depth", "must be at least 1"));
        }
        if self.max_call_depth == 0 {
            return Err(invalid("max_call_depth", "must be at least 1"));
        }
        if self.entry.is_empty() {
            return Err(invalid("entry", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = InterpreterConfig::default();
        assert_eq!(config.max_stack_depth, 1024);
        assert_eq!(config.max_call_depth, 256);
        assert_eq!(config.entry, "main");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = InterpreterConfig::from_toml_str("max_call_depth = 16").unwrap();
        assert_eq!(config.max_call_depth, 16);
        assert_eq!(config.max_stack_depth, 1024);
        assert_eq!(config.entry, "main");
    }

    #[test]
    fn full_file() {
        let config = InterpreterConfig::from_toml_str(
            r#"
max_stack_depth = 64
max_call_depth = 8
entry = "start"
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            InterpreterConfig {
                max_stack_depth: 64,
                max_call_depth: 8,
                entry: "start".to_string(),
            }
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let err = InterpreterConfig::from_toml_str("max_depth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_depth_rejected() {
        let err = InterpreterConfig::from_toml_str("max_stack_depth = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_stack_depth",
                ..
            }
        ));
    }

    #[test]
    fn missing_file() {
        let err = InterpreterConfig::load(Path::new("/nonexistent/porous.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
