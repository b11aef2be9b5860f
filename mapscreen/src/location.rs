//! Device location as reported by location providers.

use galileo_types::geo::GeoPoint;
use web_time::SystemTime;

use crate::Coordinate;

/// A single location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    coordinate: Coordinate,
    accuracy: Option<f64>,
    heading: Option<f64>,
    timestamp: SystemTime,
}

impl Location {
    /// Creates a location fix taken now.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy: None,
            heading: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Sets horizontal accuracy in meters.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Sets direction of travel in degrees clockwise from north.
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Sets the time the fix was taken.
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Position of the fix.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Horizontal accuracy in meters.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Direction of travel in degrees.
    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    /// Time the fix was taken.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Returns true if the coordinate lies on Earth.
    pub fn is_valid(&self) -> bool {
        let lat = self.coordinate.lat();
        let lon = self.coordinate.lon();
        (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
    }
}
