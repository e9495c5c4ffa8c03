use std::path::{Path, PathBuf};

use neoncity_input::ControlConfig;
use neoncity_layout::{CollisionConfig, ConfigError, LayoutConfig};
use serde::{Deserialize, Serialize};

use crate::flight::FlightConfig;
use crate::garbage::GarbageConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid layout: {0}")]
    Layout(#[from] ConfigError),
    #[error("invalid flight setting {field}: {value}")]
    Flight { field: &'static str, value: f32 },
    #[error("invalid control setting {field}: {value}")]
    Controls { field: &'static str, value: f32 },
    #[error("invalid garbage setting {field}: {value}")]
    Garbage { field: &'static str, value: f32 },
}

/// Everything a session needs, with every default matching the shipped
/// experience. Missing keys in a config file fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeonCityConfig {
    /// Seed for the layout and mini-game random source.
    pub rng_seed: u64,
    pub layout: LayoutConfig,
    pub collision: CollisionConfig,
    pub controls: ControlConfig,
    pub flight: FlightConfig,
    pub garbage: GarbageConfig,
}

impl Default for NeonCityConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x4e45_4f4e,
            layout: LayoutConfig::default(),
            collision: CollisionConfig::default(),
            controls: ControlConfig::default(),
            flight: FlightConfig::default(),
            garbage: GarbageConfig::default(),
        }
    }
}

impl NeonCityConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.layout.validate()?;
        if let Some((field, value)) = self.flight.invalid_field() {
            return Err(ConfigLoadError::Flight { field, value });
        }
        let c = &self.controls;
        let controls = [
            ("mouse_sensitivity", c.mouse_sensitivity),
            ("touch_sensitivity", c.touch_sensitivity),
            ("turn_rate", c.turn_rate),
        ];
        let bad_control = controls
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && *v >= 0.0));
        if let Some((field, value)) = bad_control {
            return Err(ConfigLoadError::Controls { field, value });
        }
        if !(c.joystick_radius.is_finite() && c.joystick_radius > 0.0) {
            return Err(ConfigLoadError::Controls {
                field: "joystick_radius",
                value: c.joystick_radius,
            });
        }
        if let Some((field, value)) = self.garbage.invalid_field() {
            return Err(ConfigLoadError::Garbage { field, value });
        }
        Ok(())
    }
}
