use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::alert::AlertConfig;

/// Key under which alert settings live in the preference file.
pub const ALERT_SETTINGS_KEY: &str = "alert_settings";

/// Small key/value store for per-user preferences that do not belong in the
/// portfolio vault.
pub trait PreferenceStore: Send + Sync {
    /// Stored alert settings, or defaults when nothing has been saved.
    fn load_alert_config(&self) -> Result<AlertConfig, CoreError>;

    fn save_alert_config(&self, config: &AlertConfig) -> Result<(), CoreError>;
}

/// Preferences kept in a plain JSON object on disk.
///
/// Unknown keys are preserved when saving.
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<Map<String, Value>, CoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(CoreError::Deserialization(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn load_alert_config(&self) -> Result<AlertConfig, CoreError> {
        let map = self.read_map()?;
        match map.get(ALERT_SETTINGS_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(AlertConfig::default()),
        }
    }

    fn save_alert_config(&self, config: &AlertConfig) -> Result<(), CoreError> {
        let mut map = self.read_map()?;
        let value = serde_json::to_value(config)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize alert settings: {e}")))?;
        map.insert(ALERT_SETTINGS_KEY.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    alert_config: Mutex<Option<AlertConfig>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn load_alert_config(&self) -> Result<AlertConfig, CoreError> {
        let guard = self.alert_config.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone().unwrap_or_default())
    }

    fn save_alert_config(&self, config: &AlertConfig) -> Result<(), CoreError> {
        *self.alert_config.lock().unwrap_or_else(|e| e.into_inner()) = Some(config.clone());
        Ok(())
    }
}
