// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Runtime settings.
//!
//! The only recognized option is the detection endpoint's base address.
//! Values are layered: built-in default, then an optional YAML file, then
//! the command line / environment.

use crate::error::AppError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base address used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base address of the detection service, e.g. `http://localhost:5000`.
    pub endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&yaml)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        Ok(settings.validated()?)
    }

    /// Resolve settings from an optional file and an optional endpoint override.
    pub fn resolve(config_file: Option<&Path>, endpoint: Option<&str>) -> Result<Self> {
        let mut settings = match config_file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        if let Some(endpoint) = endpoint {
            settings.endpoint = endpoint.to_string();
        }
        Ok(settings.validated()?)
    }

    /// Endpoint with trailing slashes removed so paths can be appended.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    fn validated(mut self) -> Result<Self, AppError> {
        self.endpoint = self.endpoint.trim().to_string();
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "endpoint must be an http(s) address, got {:?}",
                self.endpoint
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_endpoint() {
        let settings = Settings::resolve(None, None).unwrap();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_override_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: http://detector.local:8080").unwrap();

        let from_file = Settings::resolve(Some(file.path()), None).unwrap();
        assert_eq!(from_file.endpoint, "http://detector.local:8080");

        let overridden =
            Settings::resolve(Some(file.path()), Some("https://other.example/")).unwrap();
        assert_eq!(overridden.endpoint, "https://other.example/");
        assert_eq!(overridden.base_url(), "https://other.example");
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_scheme() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: http://x\nintensity: 0.8").unwrap();
        assert!(Settings::resolve(Some(file.path()), None).is_err());

        let err = Settings::resolve(None, Some("localhost:5000")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Config(_))
        ));
    }
}
