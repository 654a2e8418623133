//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! lunar-config.toml file: the observer's location, display sizes, the
//! calendar window, the polling interval and audio preferences.
//!
//! Every section and every field is optional; anything missing takes its
//! default, and a missing or malformed file yields the full default
//! configuration (London).

use crate::{InputError, Location};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// File name looked up in the working directory by [`Config::load`].
pub const CONFIG_FILE: &str = "lunar-config.toml";

/// Application configuration loaded from lunar-config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Observer location
    pub location: LocationConfig,
    /// Rendering sizes and options
    pub display: DisplayConfig,
    /// Calendar window
    pub calendar: CalendarConfig,
    /// Live session polling
    pub session: SessionConfig,
    /// Tone engine preferences
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Degrees north, -90 to 90
    pub latitude: f64,
    /// Degrees east, -180 to 180
    pub longitude: f64,
    /// Human-readable place name for reference
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Disk radius in rows for terminal rendering
    pub moon_radius: u32,
    /// Width and height of rendered image files in pixels
    pub canvas_size: u32,
    /// Soft penumbra passes along the terminator
    pub show_penumbra: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Number of days in the calendar window
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds between refreshes in watch mode
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume, 0 to 1
    pub volume: f32,
    pub sample_rate: u32,
    /// The practitioner's own instruments
    pub instruments: Vec<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            latitude: 51.5074,
            longitude: -0.1278,
            label: "London, UK (default)".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            moon_radius: 12,
            canvas_size: 64,
            show_penumbra: true,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig { days: 30 }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            poll_interval_secs: 60,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            volume: 0.3,
            sample_rate: 44_100,
            instruments: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from lunar-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration for {}", config.location.label);
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration (London)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    "No config file at {}, using default configuration (London)",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// The configured location, validated.
    pub fn location(&self) -> Result<Location, InputError> {
        Location::new(self.location.latitude, self.location.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.location.latitude, 51.5074);
        assert_eq!(config.location.longitude, -0.1278);
        assert_eq!(config.location.label, "London, UK (default)");
        assert_eq!(config.display.moon_radius, 12);
        assert!(config.display.show_penumbra);
        assert_eq!(config.calendar.days, 30);
        assert_eq!(config.session.poll_interval_secs, 60);
        assert_eq!(config.audio.volume, 0.3);
        assert!(config.audio.instruments.is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"
[location]
latitude = -33.8688
longitude = 151.2093
label = "Sydney"

[audio]
instruments = ["Gong", "Monochord"]
"#,
        );
        let config = Config::load_from_path(file.path());
        assert_eq!(config.location.label, "Sydney");
        assert_eq!(config.audio.instruments, vec!["Gong", "Monochord"]);
        assert_eq!(config.audio.volume, 0.3);
        assert_eq!(config.calendar, CalendarConfig::default());
        assert!(config.location().is_ok());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = write_config("[location]\nlatitude = \"north\"\n");
        assert_eq!(Config::load_from_path(file.path()), Config::default());
    }

    #[test]
    fn test_out_of_range_location_is_rejected() {
        let file = write_config("[location]\nlatitude = 95.0\n");
        let config = Config::load_from_path(file.path());
        assert_eq!(
            config.location(),
            Err(InputError::LatitudeOutOfRange(95.0))
        );
    }
}
