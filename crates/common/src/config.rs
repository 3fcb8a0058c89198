//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{VptzError, VptzResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Source frame size used when nothing more specific is given.
    pub frame: FrameDefaults,

    /// Controller tuning.
    pub controller: ControllerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default source frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameDefaults {
    pub width: u32,
    pub height: u32,
}

/// Tuning constants for the vPTZ controller, fixed at construction.
///
/// Smoothing factors are per frame: each update moves the viewport this
/// fraction of the remaining distance toward its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Per-frame smoothing factor applied to the crop height.
    pub zoom_smoothing: f64,

    /// Per-frame smoothing factor applied to the crop position. Also scales
    /// the deadzone nudge.
    pub translate_smoothing: f64,

    /// Subject-size-to-frame ratio at which framing switches to the fixed
    /// wide crop.
    pub fs_min: f64,

    /// Dead box size as a fraction of the target window.
    pub deadzone_fraction: f64,

    /// Crop height, as a fraction of the frame height, used for subjects at
    /// or above `fs_min`.
    pub wide_zoom_fraction: f64,

    /// Detections scoring below this are treated as absent.
    pub min_confidence: f64,

    /// Flip detections horizontally before framing (selfie view).
    pub mirror: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vptz_processing_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            zoom_smoothing: 0.05,
            translate_smoothing: 0.05,
            fs_min: 0.1,
            deadzone_fraction: 0.3,
            wide_zoom_fraction: 0.75,
            min_confidence: 0.3,
            mirror: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ControllerConfig {
    /// Check that every constant lies in the range the controller relies on.
    pub fn validate(&self) -> VptzResult<()> {
        unit_interval("zoom_smoothing", self.zoom_smoothing)?;
        unit_interval("translate_smoothing", self.translate_smoothing)?;
        unit_interval("deadzone_fraction", self.deadzone_fraction)?;
        unit_interval("wide_zoom_fraction", self.wide_zoom_fraction)?;

        if !(self.fs_min.is_finite() && self.fs_min > 0.0) {
            return Err(VptzError::config(format!(
                "fs_min must be a positive number, got {}",
                self.fs_min
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(VptzError::config(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Accepts values in `(0, 1]`.
fn unit_interval(name: &str, value: f64) -> VptzResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(VptzError::config(format!(
            "{name} must be within (0, 1], got {value}"
        )))
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> VptzResult<Self> {
        if !path.exists() {
            return Err(VptzError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.controller.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vptz").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.controller.validate().is_ok());
        assert_eq!(config.frame.width, 640);
        assert_eq!(config.frame.height, 480);
        assert_eq!(config.controller.zoom_smoothing, 0.05);
        assert_eq!(config.controller.fs_min, 0.1);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let zero_smoothing = ControllerConfig {
            zoom_smoothing: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero_smoothing.validate(),
            Err(VptzError::Config { .. })
        ));

        let negative_fs = ControllerConfig {
            fs_min: -0.1,
            ..Default::default()
        };
        assert!(negative_fs.validate().is_err());

        let nan_deadzone = ControllerConfig {
            deadzone_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(nan_deadzone.validate().is_err());

        let bad_confidence = ControllerConfig {
            min_confidence: 1.5,
            ..Default::default()
        };
        assert!(bad_confidence.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"controller":{"mirror":true},"frame":{"width":1280}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(config.controller.mirror);
        assert_eq!(config.controller.translate_smoothing, 0.05);
        assert_eq!(config.frame.width, 1280);
        assert_eq!(config.frame.height, 480);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = std::env::temp_dir().join(format!("vptz-config-test-{}", std::process::id()));
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.controller.fs_min = 0.2;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_path() {
        let path = std::env::temp_dir().join("vptz-definitely-missing/config.json");
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(VptzError::FileNotFound { .. })
        ));
    }
}
