//! User-tunable settings, read from an optional JSON file.
//!
//! Every field has a default, so a partial file (or none at all) is fine:
//!
//! ```json
//! {
//!   "click_threshold": 6.0,
//!   "warning_duration_ms": 1000,
//!   "area_gate": { "enabled": true, "lower_factor": 0.5, "upper_factor": 2.0 },
//!   "keys": { "place": "P", "select": "S", "delete": "X" },
//!   "detector": { "program": "venv/bin/python", "args": ["server/main.py"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::gesture::DEFAULT_CLICK_THRESHOLD;
use crate::stats::AreaGate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Per-axis screen distance below which press+release is a click.
    pub click_threshold: f32,
    pub warning_duration_ms: u64,
    pub area_gate: AreaGate,
    pub keys: KeyBindings,
    pub detector: DetectorConfig,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            warning_duration_ms: 1000,
            area_gate: AreaGate::default(),
            keys: KeyBindings::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl AnnotatorConfig {
    pub fn warning_duration(&self) -> Duration {
        Duration::from_millis(self.warning_duration_ms)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Key names as understood by `egui::Key::from_name` ("P", "Delete", ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub place: String,
    pub select: String,
    pub delete: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            place: "P".to_owned(),
            select: "S".to_owned(),
            delete: "X".to_owned(),
        }
    }
}

/// External command that turns an image into a detection payload.
/// The image path is appended after `args`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
}
