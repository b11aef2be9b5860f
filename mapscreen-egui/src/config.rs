//! Configuration of the map screen application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mapscreen::config::seconds;
use mapscreen::{MapScreenError, ScreenConfig};
use serde::{Deserialize, Serialize};

use crate::basemap::{BasemapCatalog, BasemapEntry};

/// Environment variable with the path to the configuration file.
pub const CONFIG_ENV: &str = "MAPSCREEN_CONFIG";

const DEFAULT_GPSD_HOST: &str = "127.0.0.1";
const DEFAULT_GPSD_PORT: u16 = 2947;
const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// Point of a replayed track.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Where the device location comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationSourceConfig {
    /// Location is never available.
    None,
    /// A single fixed location.
    Fixed(TrackPoint),
    /// A track replayed point by point.
    Replay {
        /// Points of the track.
        track: Vec<TrackPoint>,
        /// Time between two points.
        #[serde(with = "seconds", default = "default_replay_interval")]
        interval: Duration,
        /// Start over after the last point.
        #[serde(default)]
        repeat: bool,
    },
    /// A running gpsd daemon.
    Gpsd {
        /// Host gpsd listens on.
        #[serde(default = "default_gpsd_host")]
        host: String,
        /// Port gpsd listens on.
        #[serde(default = "default_gpsd_port")]
        port: u16,
    },
}

impl Default for LocationSourceConfig {
    fn default() -> Self {
        Self::Gpsd {
            host: default_gpsd_host(),
            port: default_gpsd_port(),
        }
    }
}

fn default_replay_interval() -> Duration {
    DEFAULT_REPLAY_INTERVAL
}

fn default_gpsd_host() -> String {
    DEFAULT_GPSD_HOST.to_owned()
}

fn default_gpsd_port() -> u16 {
    DEFAULT_GPSD_PORT
}

/// Configuration of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Behavior of the map screen.
    pub screen: ScreenConfig,
    /// Source of the device location.
    pub location: LocationSourceConfig,
    /// Directory for downloaded tiles. Tiles are not cached on disk if not set.
    pub tile_cache: Option<PathBuf>,
    /// Styles added to or replacing the built-in basemap catalog.
    pub basemaps: Vec<BasemapEntry>,
    /// Names of the marker icons the application can draw.
    pub icons: Vec<String>,
    /// Title of the window.
    pub title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            location: LocationSourceConfig::default(),
            tile_cache: Some(PathBuf::from(".tile_cache")),
            basemaps: vec![],
            icons: vec!["pin".to_owned()],
            title: "Map".to_owned(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, MapScreenError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapScreenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the configuration from the path given as the first argument or in the
    /// [`CONFIG_ENV`] variable, in that order. Defaults are used if neither is set.
    pub fn load(args: impl IntoIterator<Item = String>) -> Result<Self, MapScreenError> {
        let path = args
            .into_iter()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        match path {
            Some(path) => {
                log::info!("Loading configuration from {path}");
                Self::from_path(path)
            }
            None => {
                log::info!("No configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Checks the screen configuration, the location source and the basemap entries.
    pub fn validate(&self) -> Result<(), MapScreenError> {
        self.screen.validate()?;

        match &self.location {
            LocationSourceConfig::Replay { track, interval, .. } => {
                if track.is_empty() {
                    return Err(MapScreenError::Config("replay track is empty".into()));
                }

                if interval.is_zero() {
                    return Err(MapScreenError::Config(
                        "replay interval must be positive".into(),
                    ));
                }
            }
            LocationSourceConfig::Gpsd { host, .. } if host.is_empty() => {
                return Err(MapScreenError::Config("gpsd host is empty".into()));
            }
            _ => {}
        }

        self.catalog().map(|_| ())
    }

    /// Built-in basemap catalog extended with the configured entries.
    pub fn catalog(&self) -> Result<BasemapCatalog, MapScreenError> {
        let mut catalog = BasemapCatalog::default();
        for entry in &self.basemaps {
            catalog.insert(entry.clone())?;
        }

        Ok(catalog)
    }
}
