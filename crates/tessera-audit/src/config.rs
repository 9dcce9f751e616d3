//! Engine configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_core::DEFAULT_MAX_KEY_LENGTH;

use crate::error::{AuditError, Result};
use crate::handler::EmissionPolicy;

/// Settings for an [`AuditEngine`](crate::AuditEngine).
///
/// Readable from JSON or YAML; every field is optional.
///
/// ```
/// use tessera_audit::{AuditConfig, EmissionPolicy};
///
/// let config = AuditConfig::from_yaml_str("maxKeyLength: 64\nemissionFailure: log\n").unwrap();
/// assert_eq!(config.max_key_length, 64);
/// assert_eq!(config.emission_failure, EmissionPolicy::Log);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditConfig {
    /// Longest allowed event name and message key.
    pub max_key_length: usize,

    /// What to do when the sink fails.
    pub emission_failure: EmissionPolicy,

    /// Catalog file to load at startup.
    pub catalog_path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            emission_failure: EmissionPolicy::Fail,
            catalog_path: None,
        }
    }
}

impl AuditConfig {
    /// Sets the maximum key length.
    #[must_use]
    pub const fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    /// Sets the emission failure policy.
    #[must_use]
    pub const fn with_emission_failure(mut self, policy: EmissionPolicy) -> Self {
        self.emission_failure = policy;
        self
    }

    /// Sets the catalog file.
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if the document is invalid.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json)
            .map_err(|e| AuditError::Config {
                reason: e.to_string(),
            })?
            .validated()
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if the document is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str::<Self>(yaml)
            .map_err(|e| AuditError::Config {
                reason: e.to_string(),
            })?
            .validated()
    }

    /// Reads a configuration file. Files ending in `.json` are parsed as
    /// JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Config`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    fn validated(self) -> Result<Self> {
        if self.max_key_length == 0 {
            return Err(AuditError::Config {
                reason: "maxKeyLength must be greater than zero".to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuditConfig::default();
        assert_eq!(config.max_key_length, 32);
        assert_eq!(config.emission_failure, EmissionPolicy::Fail);
        assert!(config.catalog_path.is_none());
        assert_eq!(AuditConfig::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_json_config() {
        let config = AuditConfig::from_json_str(
            r#"{"emissionFailure": "ignore", "catalogPath": "/etc/tessera/catalog.json"}"#,
        )
        .unwrap();
        assert_eq!(config.emission_failure, EmissionPolicy::Ignore);
        assert_eq!(config.max_key_length, 32);
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/etc/tessera/catalog.json"))
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(AuditConfig::from_json_str(r#"{"maxKeyLength": 0}"#).is_err());
        assert!(AuditConfig::from_json_str(r#"{"emissionFailure": "retry"}"#).is_err());
        assert!(AuditConfig::from_yaml_str("maxKeyLenght: 10").is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "maxKeyLength: 48").unwrap();
        let config = AuditConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_key_length, 48);
    }

    #[test]
    fn test_builder() {
        let config = AuditConfig::default()
            .with_max_key_length(16)
            .with_emission_failure(EmissionPolicy::Log)
            .with_catalog_path("catalog.json");
        assert_eq!(config.max_key_length, 16);
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
    }
}
