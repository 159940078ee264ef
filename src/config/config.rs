//! Runtime settings for field validation.
//!
//! Settings are read from TOML. Every key is optional; the defaults match a
//! validation endpoint mounted at `/judge` with no request timeout.
//!
//! # Example TOML
//! ```toml
//! engine_path = "/judge"
//!
//! [uniqueness]
//! timeout_seconds = 5
//! requested_with = "XMLHttpRequest"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure to load or validate settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Main settings structure
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Mount point of the remote validation endpoint
    #[serde(default = "default_engine_path")]
    pub engine_path: String,

    /// Remote uniqueness check settings
    #[serde(default)]
    pub uniqueness: UniquenessSettings,
}

/// Settings for the network-backed uniqueness check
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UniquenessSettings {
    /// Give up after this many seconds (None = wait forever)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Value of the programmatic-request marker header
    #[serde(default = "default_requested_with")]
    pub requested_with: String,
}

fn default_engine_path() -> String {
    "/judge".to_string()
}

fn default_requested_with() -> String {
    "XMLHttpRequest".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            uniqueness: UniquenessSettings::default(),
        }
    }
}

impl Default for UniquenessSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            requested_with: default_requested_with(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.engine_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "engine_path must start with '/': {:?}",
                self.engine_path
            )));
        }
        if self.engine_path.len() > 1 && self.engine_path.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "engine_path must not end with '/': {:?}",
                self.engine_path
            )));
        }
        if self.uniqueness.timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "uniqueness.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.uniqueness.requested_with.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "uniqueness.requested_with must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Timeout for the uniqueness round trip, if any
    pub fn uniqueness_timeout(&self) -> Option<Duration> {
        self.uniqueness.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine_path, "/judge");
        assert_eq!(settings.uniqueness_timeout(), None);
        assert_eq!(settings.uniqueness.requested_with, "XMLHttpRequest");
    }

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
engine_path = "/validations"

[uniqueness]
timeout_seconds = 5
"#;

        let settings = Settings::from_toml_str(toml_str).unwrap();
        assert_eq!(settings.engine_path, "/validations");
        assert_eq!(settings.uniqueness_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_rejects_bad_engine_path() {
        assert!(matches!(
            Settings::from_toml_str(r#"engine_path = "judge""#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::from_toml_str(r#"engine_path = "/judge/""#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Settings::from_toml_str("[uniqueness]\ntimeout_seconds = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let result = Settings::from_toml_str("engine_path = [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "engine_path = \"/checks\"").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.engine_path, "/checks");

        assert!(matches!(
            Settings::from_file(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
