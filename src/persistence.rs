//! State persistence: save and load engine configuration to/from JSON or YAML.
//!
//! Only configuration and viewport preferences are persisted, never samples.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::trigger_config::TriggerConfig;
use crate::viewport::ManualViewport;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serializable mirror of the manual viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualViewportSerde {
    pub active: bool,
    pub start: f64,
    pub end: f64,
}

impl From<&ManualViewport> for ManualViewportSerde {
    fn from(m: &ManualViewport) -> Self {
        Self {
            active: m.active,
            start: m.start,
            end: m.end,
        }
    }
}

impl ManualViewportSerde {
    pub fn into_viewport(self) -> ManualViewport {
        ManualViewport {
            active: self.active,
            start: self.start,
            end: self.end,
        }
    }
}

/// Engine state for save/load: trigger configuration plus display preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeStateSerde {
    pub trigger: TriggerConfig,
    /// Visible window duration, seconds.
    pub visible_duration_s: f64,
    /// Sample retention horizon, seconds.
    pub retention_s: f64,
    pub manual_viewport: Option<ManualViewportSerde>,
}

impl Default for ScopeStateSerde {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            visible_duration_s: 10.0,
            retention_s: 600.0,
            manual_viewport: None,
        }
    }
}

/// Serialize the engine state as pretty JSON.
pub fn state_to_json(state: &ScopeStateSerde) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Deserialize engine state from JSON.
pub fn state_from_json(json: &str) -> Result<ScopeStateSerde, PersistenceError> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize the engine state as YAML.
pub fn state_to_yaml(state: &ScopeStateSerde) -> Result<String, PersistenceError> {
    Ok(serde_yaml::to_string(state)?)
}

/// Deserialize engine state from YAML.
pub fn state_from_yaml(yaml: &str) -> Result<ScopeStateSerde, PersistenceError> {
    Ok(serde_yaml::from_str(yaml)?)
}

fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Save the engine state to `path`; the format follows the file extension
/// (`.yaml`/`.yml` for YAML, anything else JSON).
pub fn save_state_to_path(state: &ScopeStateSerde, path: &Path) -> Result<(), PersistenceError> {
    let txt = if is_yaml_path(path) {
        state_to_yaml(state)?
    } else {
        state_to_json(state)?
    };
    std::fs::write(path, txt)?;
    Ok(())
}

/// Load the engine state from `path`; format by extension as for saving.
pub fn load_state_from_path(path: &Path) -> Result<ScopeStateSerde, PersistenceError> {
    let txt = std::fs::read_to_string(path)?;
    if is_yaml_path(path) {
        state_from_yaml(&txt)
    } else {
        state_from_json(&txt)
    }
}
