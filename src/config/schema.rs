//! Configuration schema for the network recorder.
//!
//! This module defines the configuration structure and validation logic for all
//! integrator-configurable settings of a [`crate::NetworkRecorder`].

use crate::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Main configuration structure for the network recorder.
///
/// Every field is optional in the serialized form and falls back to the
/// documented default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Maximum number of entries kept in history.
    ///
    /// Appending beyond this bound silently evicts the oldest entry.
    /// Defaults to 500.
    ///
    /// Must be > 0.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// URL substrings that disable tracking for any matching request.
    ///
    /// Useful for telemetry beacons and token refresh endpoints.
    /// Defaults to empty array.
    #[serde(default)]
    pub ignored_urls: Vec<String>,

    /// Host substrings that disable tracking for any request whose parsed
    /// host contains one of them. Defaults to empty array.
    #[serde(default)]
    pub ignored_hosts: Vec<String>,

    /// Whether request and response bodies are captured. Defaults to true.
    #[serde(default = "default_enable_body_logging")]
    pub enable_body_logging: bool,

    /// Whether tracking stays active in a production runtime. Defaults to false.
    #[serde(default)]
    pub enable_in_production: bool,

    /// Explicit runtime environment.
    ///
    /// When absent the environment is detected from `NETLOG_ENV` / `APP_ENV`
    /// at the time the recorder is constructed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<RuntimeEnvironment>,

    /// Settings for the default transport used by replay and the ambient fetch.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Runtime environment the host application is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    Development,
    Staging,
    Production,
}

/// Environment variables consulted, in order, by [`RuntimeEnvironment::detect`].
pub const ENVIRONMENT_VARIABLES: &[&str] = &["NETLOG_ENV", "APP_ENV"];

impl RuntimeEnvironment {
    /// Parses an environment name. Unknown names map to development.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => RuntimeEnvironment::Production,
            "staging" => RuntimeEnvironment::Staging,
            _ => RuntimeEnvironment::Development,
        }
    }

    /// Detects the environment from the process environment variables.
    pub fn detect() -> Self {
        ENVIRONMENT_VARIABLES
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .map(|value| Self::from_name(&value))
            .unwrap_or(RuntimeEnvironment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnvironment::Development => "development",
            RuntimeEnvironment::Staging => "staging",
            RuntimeEnvironment::Production => "production",
        }
    }
}

impl std::fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ignored_urls: Vec::new(),
            ignored_hosts: Vec::new(),
            enable_body_logging: default_enable_body_logging(),
            enable_in_production: false,
            environment: None,
            transport: TransportConfig::default(),
        }
    }
}

impl RecorderConfig {
    /// Validates the configuration values.
    ///
    /// # Returns
    ///
    /// `Ok(())` if valid, or `Err(String)` describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("maxEntries must be greater than 0".to_string());
        }

        if self.ignored_urls.iter().any(|u| u.is_empty()) {
            return Err("ignoredUrls must not contain empty patterns".to_string());
        }

        if self.ignored_hosts.iter().any(|h| h.is_empty()) {
            return Err("ignoredHosts must not contain empty patterns".to_string());
        }

        self.transport.validate()
    }

    /// Resolves the runtime environment, detecting it when not set explicitly.
    pub fn resolved_environment(&self) -> RuntimeEnvironment {
        self.environment.unwrap_or_else(RuntimeEnvironment::detect)
    }

    /// Merges this configuration with another, using values from `other` where present.
    ///
    /// # Arguments
    ///
    /// * `other` - Configuration to merge with (takes precedence)
    pub fn merge(&self, other: &RecorderConfig) -> Self {
        Self {
            max_entries: other.max_entries,
            ignored_urls: other.ignored_urls.clone(),
            ignored_hosts: other.ignored_hosts.clone(),
            enable_body_logging: other.enable_body_logging,
            enable_in_production: other.enable_in_production,
            environment: other.environment.or(self.environment),
            transport: other.transport.clone(),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ignored_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignored_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_body_logging(mut self, enabled: bool) -> Self {
        self.enable_body_logging = enabled;
        self
    }

    pub fn with_environment(mut self, environment: RuntimeEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_enable_in_production(mut self, enabled: bool) -> Self {
        self.enable_in_production = enabled;
        self
    }
}

// Default value functions for serde

fn default_max_entries() -> usize {
    500
}

fn default_enable_body_logging() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecorderConfig::default();
        assert_eq!(config.max_entries, 500);
        assert!(config.ignored_urls.is_empty());
        assert!(config.ignored_hosts.is_empty());
        assert!(config.enable_body_logging);
        assert!(!config.enable_in_production);
        assert_eq!(config.environment, None);
        assert_eq!(config.transport.timeout, 30000);
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_max_entries() {
        let config = RecorderConfig::default().with_max_entries(0);
        assert_eq!(
            config.validate().unwrap_err(),
            "maxEntries must be greater than 0"
        );
    }

    #[test]
    fn test_config_validation_empty_pattern() {
        let config = RecorderConfig::default().with_ignored_hosts([""]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let json = r#"{
            "maxEntries": 50,
            "ignoredHosts": ["telemetry.example.com"]
        }"#;

        let config: RecorderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.ignored_hosts, vec!["telemetry.example.com"]);
        assert!(config.enable_body_logging);
        assert!(!config.enable_in_production);
    }

    #[test]
    fn test_environment_deserialization() {
        let config: RecorderConfig =
            serde_json::from_str(r#"{"environment": "production"}"#).unwrap();
        assert_eq!(config.environment, Some(RuntimeEnvironment::Production));
        assert_eq!(
            config.resolved_environment(),
            RuntimeEnvironment::Production
        );
    }

    #[test]
    fn test_environment_from_name() {
        assert_eq!(
            RuntimeEnvironment::from_name("PROD"),
            RuntimeEnvironment::Production
        );
        assert_eq!(
            RuntimeEnvironment::from_name("staging"),
            RuntimeEnvironment::Staging
        );
        assert_eq!(
            RuntimeEnvironment::from_name("qa"),
            RuntimeEnvironment::Development
        );
    }

    #[test]
    fn test_merge_keeps_base_environment() {
        let base = RecorderConfig::default().with_environment(RuntimeEnvironment::Staging);
        let custom = RecorderConfig::default().with_max_entries(10);

        let merged = base.merge(&custom);
        assert_eq!(merged.max_entries, 10);
        assert_eq!(merged.environment, Some(RuntimeEnvironment::Staging));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&RecorderConfig::default()).unwrap();
        assert!(json.contains("maxEntries"));
        assert!(json.contains("enableBodyLogging"));
        assert!(!json.contains("environment"));
    }
}
