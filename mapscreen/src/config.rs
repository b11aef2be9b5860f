//! Configuration of the map screen.

use std::path::Path;
use std::time::Duration;

use galileo_types::latlon;
use serde::{Deserialize, Serialize};

use crate::camera::CameraTarget;
use crate::error::MapScreenError;
use crate::gesture::LongPressConfig;
use crate::marker::PinIcon;
use crate::style::StyleTable;

const DEFAULT_LOCATE_ZOOM: f64 = 14.0;
const DEFAULT_LOCATE_DURATION: Duration = Duration::from_secs(1);
const DEFAULT_FOLLOW_DURATION: Duration = Duration::from_secs(2);
const DEFAULT_NOTICE_LIFETIME: Duration = Duration::from_secs(4);

/// What the camera does when a new location arrives.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecenterPolicy {
    /// Fly to every new location.
    #[default]
    Always,
    /// Fly to new locations until the user pans or zooms the map. Following is resumed when the
    /// user asks to be located again.
    PauseAfterInteraction,
}

/// Configuration of a [`MapScreenController`](crate::MapScreenController).
///
/// Every field has a default, so a partial JSON document is a valid configuration:
///
/// ```
/// use mapscreen::{RecenterPolicy, ScreenConfig};
///
/// let config = ScreenConfig::from_json_str(r#"{ "recenter_policy": "pause_after_interaction" }"#).unwrap();
///
/// assert_eq!(config.recenter_policy(), RecenterPolicy::PauseAfterInteraction);
/// assert_eq!(config.locate_zoom(), 14.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    initial_camera: CameraTarget,
    styles: StyleTable,
    locate_zoom: f64,
    #[serde(with = "seconds")]
    locate_duration: Duration,
    #[serde(with = "seconds")]
    follow_duration: Duration,
    recenter_policy: RecenterPolicy,
    marker_icon: PinIcon,
    long_press: LongPressConfig,
    #[serde(with = "seconds")]
    notice_lifetime: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            initial_camera: CameraTarget::new(latlon!(39.5, -98.0), 2.0)
                .with_bearing(0.0)
                .with_pitch(0.0),
            styles: StyleTable::default(),
            locate_zoom: DEFAULT_LOCATE_ZOOM,
            locate_duration: DEFAULT_LOCATE_DURATION,
            follow_duration: DEFAULT_FOLLOW_DURATION,
            recenter_policy: RecenterPolicy::default(),
            marker_icon: PinIcon::default(),
            long_press: LongPressConfig::default(),
            notice_lifetime: DEFAULT_NOTICE_LIFETIME,
        }
    }
}

impl ScreenConfig {
    /// Parses and validates configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, MapScreenError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Reads and validates configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapScreenError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that the configuration can be used.
    pub fn validate(&self) -> Result<(), MapScreenError> {
        self.styles.validate()?;

        if !self.initial_camera.is_valid() {
            return Err(MapScreenError::Config(
                "initial camera is outside of valid range".into(),
            ));
        }

        if !self.locate_zoom.is_finite() || self.locate_zoom < 0.0 {
            return Err(MapScreenError::Config(format!(
                "invalid locate zoom {}",
                self.locate_zoom
            )));
        }

        Ok(())
    }

    /// Camera set when the screen is initialized.
    pub fn initial_camera(&self) -> &CameraTarget {
        &self.initial_camera
    }

    /// Sets the camera set when the screen is initialized.
    pub fn with_initial_camera(mut self, camera: CameraTarget) -> Self {
        self.initial_camera = camera;
        self
    }

    /// Options of the style selector.
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// Sets the options of the style selector.
    pub fn with_styles(mut self, styles: StyleTable) -> Self {
        self.styles = styles;
        self
    }

    /// Zoom level the camera flies to when showing the user location.
    pub fn locate_zoom(&self) -> f64 {
        self.locate_zoom
    }

    /// Sets the zoom level the camera flies to when showing the user location.
    pub fn with_locate_zoom(mut self, zoom: f64) -> Self {
        self.locate_zoom = zoom;
        self
    }

    /// Duration of the flight when the user asks to be located.
    pub fn locate_duration(&self) -> Duration {
        self.locate_duration
    }

    /// Duration of the flight that follows location updates.
    pub fn follow_duration(&self) -> Duration {
        self.follow_duration
    }

    /// Sets flight durations for the locate action and for following location updates.
    pub fn with_durations(mut self, locate: Duration, follow: Duration) -> Self {
        self.locate_duration = locate;
        self.follow_duration = follow;
        self
    }

    /// What happens to the camera when the location changes.
    pub fn recenter_policy(&self) -> RecenterPolicy {
        self.recenter_policy
    }

    /// Sets what happens to the camera when the location changes.
    pub fn with_recenter_policy(mut self, policy: RecenterPolicy) -> Self {
        self.recenter_policy = policy;
        self
    }

    /// Icon of the markers placed by long press.
    pub fn marker_icon(&self) -> &PinIcon {
        &self.marker_icon
    }

    /// Sets the icon of the markers placed by long press.
    pub fn with_marker_icon(mut self, icon: PinIcon) -> Self {
        self.marker_icon = icon;
        self
    }

    /// Long press recognition parameters.
    pub fn long_press(&self) -> &LongPressConfig {
        &self.long_press
    }

    /// How long a notice banner stays on screen.
    pub fn notice_lifetime(&self) -> Duration {
        self.notice_lifetime
    }
}

/// (De)serializes a [`Duration`] as a number of seconds, for use with `#[serde(with = ...)]`.
pub mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes the duration as fractional seconds.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    /// Reads fractional seconds. Negative and non-finite values are rejected.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
    }
}
