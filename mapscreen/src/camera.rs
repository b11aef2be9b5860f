//! Camera targets given to the [`MapSurface`](crate::MapSurface).

use std::time::Duration;

use galileo_types::geo::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// Resolution (meters per pixel) of the zoom level 0 of the Web Mercator 256px tile pyramid.
pub const ZOOM_ZERO_RESOLUTION: f64 = 156543.03392800014;

/// Converts a (fractional) zoom level into map resolution in meters per pixel.
pub fn zoom_to_resolution(zoom: f64) -> f64 {
    ZOOM_ZERO_RESOLUTION / 2f64.powf(zoom)
}

/// Converts map resolution in meters per pixel into a (fractional) zoom level.
pub fn resolution_to_zoom(resolution: f64) -> f64 {
    (ZOOM_ZERO_RESOLUTION / resolution).log2()
}

/// Where the camera should look and how long the transition should take.
///
/// A zero duration means the camera jumps to the target immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    center: Coordinate,
    zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bearing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pitch: Option<f64>,
    #[serde(default, with = "crate::config::seconds")]
    duration: Duration,
}

impl CameraTarget {
    /// Creates a target at the given center and zoom, with no rotation and no animation.
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            bearing: None,
            pitch: None,
            duration: Duration::ZERO,
        }
    }

    /// Sets the bearing in degrees clockwise from north.
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = Some(bearing);
        self
    }

    /// Sets the tilt of the camera in degrees from the nadir.
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Sets the duration of the transition.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Center of the view.
    pub fn center(&self) -> Coordinate {
        self.center
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Resolution corresponding to the zoom level.
    pub fn resolution(&self) -> f64 {
        zoom_to_resolution(self.zoom)
    }

    /// Bearing in degrees, if set.
    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Pitch in degrees, if set.
    pub fn pitch(&self) -> Option<f64> {
        self.pitch
    }

    /// Transition duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns true if the target should be applied without animation.
    pub fn is_immediate(&self) -> bool {
        self.duration.is_zero()
    }

    /// Returns true if the target is a valid place on Earth at a sensible zoom.
    pub fn is_valid(&self) -> bool {
        let lat = self.center.lat();
        let lon = self.center.lon();

        lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
            && self.zoom.is_finite()
            && self.zoom >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use galileo_types::latlon;

    use super::*;

    #[test]
    fn zoom_and_resolution_are_inverse() {
        assert_relative_eq!(zoom_to_resolution(0.0), ZOOM_ZERO_RESOLUTION);
        assert_relative_eq!(zoom_to_resolution(4.0), ZOOM_ZERO_RESOLUTION / 16.0);
        assert_relative_eq!(resolution_to_zoom(zoom_to_resolution(14.0)), 14.0, epsilon = 1e-9);
        assert_relative_eq!(resolution_to_zoom(zoom_to_resolution(2.5)), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn builder_sets_fields() {
        let target = CameraTarget::new(latlon!(39.5, -98.0), 2.0)
            .with_bearing(0.0)
            .with_pitch(0.0)
            .with_duration(Duration::from_secs(2));

        assert_eq!(target.bearing(), Some(0.0));
        assert_eq!(target.pitch(), Some(0.0));
        assert_eq!(target.duration(), Duration::from_secs(2));
        assert!(!target.is_immediate());
        assert!(target.is_valid());
    }

    #[test]
    fn rejects_out_of_range_targets() {
        assert!(!CameraTarget::new(latlon!(91.0, 0.0), 2.0).is_valid());
        assert!(!CameraTarget::new(latlon!(0.0, f64::NAN), 2.0).is_valid());
        assert!(!CameraTarget::new(latlon!(0.0, 0.0), -1.0).is_valid());
    }
}
