//! Point markers placed on the map.

use serde::{Deserialize, Serialize};

use crate::{Color, Coordinate};

/// Icon of a marker: a named image tinted with a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinIcon {
    name: String,
    tint: Color,
}

impl Default for PinIcon {
    fn default() -> Self {
        Self::new("pin", Color::RED)
    }
}

impl PinIcon {
    /// Creates a new icon.
    pub fn new(name: impl Into<String>, tint: Color) -> Self {
        Self {
            name: name.into(),
            tint,
        }
    }

    /// Name the surface resolves the image by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tint color.
    pub fn tint(&self) -> Color {
        self.tint
    }
}

/// A marker at a coordinate.
///
/// A marker without an icon is drawn with the surface default look.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    coordinate: Coordinate,
    icon: Option<PinIcon>,
}

impl Marker {
    /// Creates a marker with the surface default look.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            icon: None,
        }
    }

    /// Sets a custom icon.
    pub fn with_icon(mut self, icon: PinIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Position of the marker.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Custom icon, if any.
    pub fn icon(&self) -> Option<&PinIcon> {
        self.icon.as_ref()
    }
}
