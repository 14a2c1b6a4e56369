//! Configuration file handling.
//!
//! Settings live in an INI file at `<config_dir>/pathview/config.ini`:
//!
//! ```ini
//! [destination]
//! latitude = -29.3409
//! longitude = -49.7267
//!
//! [routing]
//! api_key =
//! stroke_width = 3
//! stroke_color = hotpink
//! refresh_distance_m = 25
//!
//! [camera]
//! initial_pitch = 40
//! pitch_step = 5
//! device_zoom = 15
//! destination_zoom = 16
//!
//! [position]
//! accuracy = highest
//! interval_ms = 1000
//! min_distance_m = 0
//!
//! [simulation]
//! start_latitude = -29.3370
//! start_longitude = -49.7230
//! speed_mps = 1.4
//!
//! [logging]
//! level = info
//! directory = /home/user/.local/share/pathview/logs
//! ```
//!
//! A missing file or key falls back to the defaults. The routing key can be
//! supplied through `PATHVIEW_ROUTING_API_KEY` instead of the file.

mod file;

pub use file::{
    CameraSettings, ConfigFile, DestinationSettings, LoggingSettings, PositionSettings,
    RoutingSettings, SimulationSettings, DEFAULT_SIMULATION_START,
};

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable that overrides `[routing] api_key`.
pub const ROUTING_API_KEY_ENV: &str = "PATHVIEW_ROUTING_API_KEY";

/// Errors reading or interpreting the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(String),

    #[error("Invalid value for {section}.{key}: '{value}' ({reason})")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &str,
        key: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Directory holding the config file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pathview")
}

/// Full path of the config file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with("pathview/config.ini"));
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::invalid("camera", "pitch_step", "x", "not a number");
        assert_eq!(
            err.to_string(),
            "Invalid value for camera.pitch_step: 'x' (not a number)"
        );
    }
}
