//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{config_file_path, ConfigError, ROUTING_API_KEY_ENV};
use crate::camera::{ZoomLevels, DEFAULT_DESTINATION_ZOOM, DEFAULT_DEVICE_ZOOM};
use crate::coord::Coordinate;
use crate::focus::{PitchAngle, DEFAULT_PITCH, DEFAULT_PITCH_STEP};
use crate::logging::{default_log_directory, LogConfig, DEFAULT_LOG_LEVEL};
use crate::position::{
    Accuracy, SimulationConfig, WatchOptions, DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL,
    DEFAULT_SPEED_MPS,
};
use crate::route::{
    RouteStyle, RoutingCredential, DEFAULT_ROUTE_REFRESH_DISTANCE_M, DEFAULT_STROKE_COLOR,
    DEFAULT_STROKE_WIDTH,
};
use crate::session::{SessionConfig, DEFAULT_DESTINATION};

/// Where the simulated walk starts when none is configured.
pub const DEFAULT_SIMULATION_START: Coordinate = Coordinate::new(-29.3370, -49.7230);

/// `[destination]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationSettings {
    pub latitude: f64,
    pub longitude: f64,
}

/// `[routing]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingSettings {
    /// Routing provider key; `None` disables the route overlay.
    pub api_key: Option<String>,
    pub stroke_width: f32,
    pub stroke_color: String,
    pub refresh_distance_m: f64,
}

/// `[camera]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub initial_pitch: i32,
    pub pitch_step: i32,
    pub device_zoom: f64,
    pub destination_zoom: f64,
}

/// `[position]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSettings {
    pub accuracy: Accuracy,
    pub interval_ms: u64,
    pub min_distance_m: f64,
}

/// `[simulation]` section, used by the CLI demo.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub speed_mps: f64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: PathBuf,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub destination: DestinationSettings,
    pub routing: RoutingSettings,
    pub camera: CameraSettings,
    pub position: PositionSettings,
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            destination: DestinationSettings {
                latitude: DEFAULT_DESTINATION.latitude,
                longitude: DEFAULT_DESTINATION.longitude,
            },
            routing: RoutingSettings {
                api_key: None,
                stroke_width: DEFAULT_STROKE_WIDTH,
                stroke_color: DEFAULT_STROKE_COLOR.to_string(),
                refresh_distance_m: DEFAULT_ROUTE_REFRESH_DISTANCE_M,
            },
            camera: CameraSettings {
                initial_pitch: DEFAULT_PITCH as i32,
                pitch_step: DEFAULT_PITCH_STEP,
                device_zoom: DEFAULT_DEVICE_ZOOM,
                destination_zoom: DEFAULT_DESTINATION_ZOOM,
            },
            position: PositionSettings {
                accuracy: Accuracy::default(),
                interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
                min_distance_m: DEFAULT_MIN_DISTANCE_M,
            },
            simulation: SimulationSettings {
                start_latitude: DEFAULT_SIMULATION_START.latitude,
                start_longitude: DEFAULT_SIMULATION_START.longitude,
                speed_mps: DEFAULT_SPEED_MPS,
            },
            logging: LoggingSettings {
                level: DEFAULT_LOG_LEVEL.to_string(),
                directory: default_log_directory(),
            },
        }
    }
}

impl ConfigFile {
    /// Load from the default path, falling back to defaults if it is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults if it is missing.
    ///
    /// `PATHVIEW_ROUTING_API_KEY`, when set, replaces the file's key.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let ini = Ini::load_from_file(path).map_err(|e| match e {
                ini::Error::Io(e) => ConfigError::Io(e),
                ini::Error::Parse(e) => ConfigError::Parse(e.to_string()),
            })?;
            debug!(path = %path.display(), "Loaded config file");
            Self::from_ini(&ini)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        Ok(config.with_api_key_override(std::env::var(ROUTING_API_KEY_ENV).ok()))
    }

    /// Parse from INI text. No environment override is applied.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    /// Replace the routing key if `key` is non-blank.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.routing.api_key = Some(key);
        }
        self
    }

    /// Every setting as `(section, key, value)` for display. The API key is masked.
    pub fn entries(&self) -> Vec<(&'static str, &'static str, String)> {
        let api_key = self
            .routing
            .api_key
            .as_deref()
            .and_then(RoutingCredential::new)
            .map(|c| c.to_string())
            .unwrap_or_default();

        vec![
            ("destination", "latitude", self.destination.latitude.to_string()),
            ("destination", "longitude", self.destination.longitude.to_string()),
            ("routing", "api_key", api_key),
            ("routing", "stroke_width", self.routing.stroke_width.to_string()),
            ("routing", "stroke_color", self.routing.stroke_color.clone()),
            (
                "routing",
                "refresh_distance_m",
                self.routing.refresh_distance_m.to_string(),
            ),
            ("camera", "initial_pitch", self.camera.initial_pitch.to_string()),
            ("camera", "pitch_step", self.camera.pitch_step.to_string()),
            ("camera", "device_zoom", self.camera.device_zoom.to_string()),
            (
                "camera",
                "destination_zoom",
                self.camera.destination_zoom.to_string(),
            ),
            ("position", "accuracy", self.position.accuracy.to_string()),
            ("position", "interval_ms", self.position.interval_ms.to_string()),
            (
                "position",
                "min_distance_m",
                self.position.min_distance_m.to_string(),
            ),
            (
                "simulation",
                "start_latitude",
                self.simulation.start_latitude.to_string(),
            ),
            (
                "simulation",
                "start_longitude",
                self.simulation.start_longitude.to_string(),
            ),
            ("simulation", "speed_mps", self.simulation.speed_mps.to_string()),
            ("logging", "level", self.logging.level.clone()),
            (
                "logging",
                "directory",
                self.logging.directory.display().to_string(),
            ),
        ]
    }

    /// Validate and build the session configuration.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let destination = coordinate(
            "destination",
            self.destination.latitude,
            self.destination.longitude,
        )?;

        let zoom = ZoomLevels::new(self.camera.device_zoom, self.camera.destination_zoom)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "camera",
                    "destination_zoom",
                    self.camera.destination_zoom,
                    "must be finite and greater than device_zoom",
                )
            })?;

        let initial_pitch = PitchAngle::new(self.camera.initial_pitch).map_err(|e| {
            ConfigError::invalid("camera", "initial_pitch", self.camera.initial_pitch, e.to_string())
        })?;

        if self.camera.pitch_step <= 0 {
            return Err(ConfigError::invalid(
                "camera",
                "pitch_step",
                self.camera.pitch_step,
                "must be positive",
            ));
        }

        non_negative("position", "min_distance_m", self.position.min_distance_m)?;
        non_negative("routing", "refresh_distance_m", self.routing.refresh_distance_m)?;

        let watch = WatchOptions::default()
            .with_accuracy(self.position.accuracy)
            .with_min_interval(Duration::from_millis(self.position.interval_ms))
            .with_min_distance_m(self.position.min_distance_m);

        let style = RouteStyle {
            stroke_width: self.routing.stroke_width,
            stroke_color: self.routing.stroke_color.clone(),
        };

        Ok(SessionConfig::new(destination)
            .with_zoom(zoom)
            .with_pitch(initial_pitch, self.camera.pitch_step)
            .with_watch_options(watch)
            .with_route_style(style)
            .with_routing_credential(
                self.routing.api_key.as_deref().and_then(RoutingCredential::new),
            )
            .with_route_refresh_distance_m(self.routing.refresh_distance_m))
    }

    /// Validate and build the simulated walk toward the destination.
    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let start = coordinate(
            "simulation",
            self.simulation.start_latitude,
            self.simulation.start_longitude,
        )?;
        let target = coordinate(
            "destination",
            self.destination.latitude,
            self.destination.longitude,
        )?;
        if !self.simulation.speed_mps.is_finite() || self.simulation.speed_mps <= 0.0 {
            return Err(ConfigError::invalid(
                "simulation",
                "speed_mps",
                self.simulation.speed_mps,
                "must be positive",
            ));
        }
        Ok(SimulationConfig::new(start, target).with_speed_mps(self.simulation.speed_mps))
    }

    /// Logging configuration.
    pub fn log_config(&self) -> LogConfig {
        LogConfig::default()
            .with_directory(self.logging.directory.clone())
            .with_level(self.logging.level.clone())
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let accuracy = match value(ini, "position", "accuracy") {
            None => defaults.position.accuracy,
            Some(raw) => Accuracy::from_config_str(raw).ok_or_else(|| {
                ConfigError::invalid(
                    "position",
                    "accuracy",
                    raw,
                    "expected lowest, low, balanced, high, highest or navigation",
                )
            })?,
        };

        Ok(Self {
            destination: DestinationSettings {
                latitude: parse(ini, "destination", "latitude", defaults.destination.latitude)?,
                longitude: parse(ini, "destination", "longitude", defaults.destination.longitude)?,
            },
            routing: RoutingSettings {
                api_key: value(ini, "routing", "api_key").map(str::to_string),
                stroke_width: parse(ini, "routing", "stroke_width", defaults.routing.stroke_width)?,
                stroke_color: value(ini, "routing", "stroke_color")
                    .map(str::to_string)
                    .unwrap_or(defaults.routing.stroke_color),
                refresh_distance_m: parse(
                    ini,
                    "routing",
                    "refresh_distance_m",
                    defaults.routing.refresh_distance_m,
                )?,
            },
            camera: CameraSettings {
                initial_pitch: parse(ini, "camera", "initial_pitch", defaults.camera.initial_pitch)?,
                pitch_step: parse(ini, "camera", "pitch_step", defaults.camera.pitch_step)?,
                device_zoom: parse(ini, "camera", "device_zoom", defaults.camera.device_zoom)?,
                destination_zoom: parse(
                    ini,
                    "camera",
                    "destination_zoom",
                    defaults.camera.destination_zoom,
                )?,
            },
            position: PositionSettings {
                accuracy,
                interval_ms: parse(ini, "position", "interval_ms", defaults.position.interval_ms)?,
                min_distance_m: parse(
                    ini,
                    "position",
                    "min_distance_m",
                    defaults.position.min_distance_m,
                )?,
            },
            simulation: SimulationSettings {
                start_latitude: parse(
                    ini,
                    "simulation",
                    "start_latitude",
                    defaults.simulation.start_latitude,
                )?,
                start_longitude: parse(
                    ini,
                    "simulation",
                    "start_longitude",
                    defaults.simulation.start_longitude,
                )?,
                speed_mps: parse(ini, "simulation", "speed_mps", defaults.simulation.speed_mps)?,
            },
            logging: LoggingSettings {
                level: value(ini, "logging", "level")
                    .map(str::to_string)
                    .unwrap_or(defaults.logging.level),
                directory: value(ini, "logging", "directory")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.logging.directory),
            },
        })
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("destination"))
            .set("latitude", self.destination.latitude.to_string())
            .set("longitude", self.destination.longitude.to_string());
        ini.with_section(Some("routing"))
            .set("api_key", self.routing.api_key.clone().unwrap_or_default())
            .set("stroke_width", self.routing.stroke_width.to_string())
            .set("stroke_color", self.routing.stroke_color.clone())
            .set(
                "refresh_distance_m",
                self.routing.refresh_distance_m.to_string(),
            );
        ini.with_section(Some("camera"))
            .set("initial_pitch", self.camera.initial_pitch.to_string())
            .set("pitch_step", self.camera.pitch_step.to_string())
            .set("device_zoom", self.camera.device_zoom.to_string())
            .set("destination_zoom", self.camera.destination_zoom.to_string());
        ini.with_section(Some("position"))
            .set("accuracy", self.position.accuracy.as_config_str())
            .set("interval_ms", self.position.interval_ms.to_string())
            .set("min_distance_m", self.position.min_distance_m.to_string());
        ini.with_section(Some("simulation"))
            .set("start_latitude", self.simulation.start_latitude.to_string())
            .set("start_longitude", self.simulation.start_longitude.to_string())
            .set("speed_mps", self.simulation.speed_mps.to_string());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.clone())
            .set("directory", self.logging.directory.display().to_string());
        ini
    }
}

/// Trimmed, non-empty value for `section.key`.
fn value<'a>(ini: &'a Ini, section: &str, key: &str) -> Option<&'a str> {
    ini.section(Some(section))
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse<T>(ini: &Ini, section: &str, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value(ini, section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(section, key, raw, e.to_string())),
    }
}

fn coordinate(section: &str, latitude: f64, longitude: f64) -> Result<Coordinate, ConfigError> {
    Coordinate::try_new(latitude, longitude).map_err(|e| {
        ConfigError::invalid(
            section,
            "latitude/longitude",
            format!("{}, {}", latitude, longitude),
            e.to_string(),
        )
    })
}

fn non_negative(section: &str, key: &str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(section, key, v, "must be zero or positive"))
    }
}
