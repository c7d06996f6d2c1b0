//! Configuration management for the network recorder.
//!
//! This module provides configuration loading, validation, and access through a singleton pattern.
//! Configuration is read from a settings document under the `"netlog"` key and merged with defaults.
//! Recorders built explicitly take their own [`RecorderConfig`]; the global store only feeds the
//! process-wide default recorder.

pub mod schema;

pub use schema::{RecorderConfig, RuntimeEnvironment, ENVIRONMENT_VARIABLES};

use log::warn;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;
use std::sync::RwLock;

/// Key under which recorder settings live in a settings document.
pub const SETTINGS_KEY: &str = "netlog";

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be updated when settings change.
static CONFIG: Lazy<RwLock<RecorderConfig>> = Lazy::new(|| RwLock::new(RecorderConfig::default()));

/// Loads configuration from a JSON settings document.
///
/// Reads the `"netlog"` settings, merges them with defaults, validates the
/// result, and updates the global configuration.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value containing settings under the `"netlog"` key
///
/// # Returns
///
/// `Ok(RecorderConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use netlog::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "netlog": {
///         "maxEntries": 200,
///         "ignoredHosts": ["telemetry.example.com"]
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.max_entries, 200);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<RecorderConfig, String> {
    let mut config = RecorderConfig::default();

    if let Some(settings) = settings_json {
        if let Some(recorder_settings) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<RecorderConfig>(recorder_settings.clone()) {
                Ok(user_config) => {
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    warn!(
                        "Failed to parse {} settings: {}. Using defaults.",
                        SETTINGS_KEY, e
                    );
                }
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// The file has the same shape as the document accepted by [`load_config`].
pub fn load_config_from_path(path: &Path) -> Result<RecorderConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let settings: Value = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    load_config(Some(settings))
}

/// Gets the current global configuration.
///
/// If configuration has not been loaded yet, returns the default configuration.
pub fn get_config() -> RecorderConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| RecorderConfig::default())
}

/// Updates a specific configuration setting.
///
/// Reverts to defaults if the updated configuration fails validation.
///
/// # Example
///
/// ```no_run
/// use netlog::config::update_config;
///
/// update_config(|config| {
///     config.ignored_urls.push("/oauth/token".to_string());
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut RecorderConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            warn!("Configuration validation failed after update: {}", e);
            *config = RecorderConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = RecorderConfig::default();
    }
}
