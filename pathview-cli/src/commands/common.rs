//! Settings resolution shared across CLI commands.

use std::path::PathBuf;

use pathview::config::ConfigFile;

use crate::error::CliError;

/// Command-line overrides for the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub dest_lat: Option<f64>,
    pub dest_lon: Option<f64>,
    pub api_key: Option<String>,
    pub interval_ms: Option<u64>,
    pub speed_mps: Option<f64>,
    pub log_level: Option<String>,
}

/// Load the config file and apply CLI overrides.
///
/// CLI takes precedence, then environment, then the file, then defaults.
pub fn resolve_config(overrides: &Overrides) -> Result<ConfigFile, CliError> {
    let config = match &overrides.config_path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            ConfigFile::load_from(path)?
        }
        None => ConfigFile::load()?,
    };

    Ok(apply_overrides(config, overrides))
}

/// Apply CLI overrides to a loaded config.
pub fn apply_overrides(config: ConfigFile, overrides: &Overrides) -> ConfigFile {
    let mut config = config.with_api_key_override(overrides.api_key.clone());

    if let Some(lat) = overrides.dest_lat {
        config.destination.latitude = lat;
    }
    if let Some(lon) = overrides.dest_lon {
        config.destination.longitude = lon;
    }
    if let Some(interval) = overrides.interval_ms {
        config.position.interval_ms = interval;
    }
    if let Some(speed) = overrides.speed_mps {
        config.simulation.speed_mps = speed;
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_file() {
        let overrides = Overrides {
            dest_lat: Some(51.5),
            dest_lon: Some(-0.12),
            api_key: Some("cli-key".to_string()),
            interval_ms: Some(250),
            ..Default::default()
        };
        let config = apply_overrides(ConfigFile::default(), &overrides);

        assert_eq!(config.destination.latitude, 51.5);
        assert_eq!(config.destination.longitude, -0.12);
        assert_eq!(config.routing.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.position.interval_ms, 250);
        assert_eq!(config.simulation.speed_mps, 1.4);
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let overrides = Overrides {
            config_path: Some(dir.path().join("missing.ini")),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(&overrides),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_config_path_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[camera]\ninitial_pitch = 20\n").unwrap();

        let overrides = Overrides {
            config_path: Some(path),
            ..Default::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.camera.initial_pitch, 20);
    }
}
