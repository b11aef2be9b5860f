//! Test doubles of the map screen collaborators.

use std::collections::HashSet;

use galileo_types::cartesian::CartesianPoint2d;
use galileo_types::latlon;

use crate::camera::CameraTarget;
use crate::error::{LocationError, MapScreenError};
use crate::location::Location;
use crate::marker::Marker;
use crate::style::{StyleOption, StyleUri};
use crate::surface::{MapSurface, StyleSelector};
use crate::{Coordinate, ScreenPoint};

/// Map surface that records every call.
///
/// Screen points map to coordinates as `lat = -y / 10, lon = x / 10`; points with negative `y`
/// are "above the horizon" and have no coordinate.
pub struct RecordingSurface {
    pub camera: CameraTarget,
    pub set_camera_calls: Vec<CameraTarget>,
    pub flights: Vec<CameraTarget>,
    pub style: Option<StyleUri>,
    pub style_calls: Vec<StyleUri>,
    pub failing_styles: HashSet<String>,
    pub location: Option<Location>,
    pub icons: Vec<String>,
    pub markers: Vec<Marker>,
    pub replace_calls: usize,
    pub puck_enabled: bool,
    pub updates_started: bool,
    pub start_error: Option<LocationError>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            camera: CameraTarget::new(latlon!(0.0, 0.0), 0.0),
            set_camera_calls: vec![],
            flights: vec![],
            style: None,
            style_calls: vec![],
            failing_styles: HashSet::new(),
            location: None,
            icons: vec!["pin".to_owned()],
            markers: vec![],
            replace_calls: 0,
            puck_enabled: false,
            updates_started: false,
            start_error: None,
        }
    }
}

impl RecordingSurface {
    pub fn coordinate_at(x: f64, y: f64) -> Coordinate {
        latlon!(-y / 10.0, x / 10.0)
    }
}

impl MapSurface for RecordingSurface {
    fn camera(&self) -> CameraTarget {
        self.camera
    }

    fn set_camera(&mut self, target: &CameraTarget) {
        self.camera = *target;
        self.set_camera_calls.push(*target);
    }

    fn fly_to(&mut self, target: &CameraTarget) {
        self.camera = *target;
        self.flights.push(*target);
    }

    fn style(&self) -> Option<&StyleUri> {
        self.style.as_ref()
    }

    fn set_style(&mut self, uri: &StyleUri) -> Result<(), MapScreenError> {
        self.style_calls.push(uri.clone());
        if self.failing_styles.contains(uri.as_str()) {
            return Err(MapScreenError::StyleLoad {
                uri: uri.clone(),
                reason: "test failure".into(),
            });
        }

        self.style = Some(uri.clone());
        Ok(())
    }

    fn coordinate_for(&self, point: ScreenPoint) -> Option<Coordinate> {
        if point.y() < 0.0 {
            return None;
        }

        Some(Self::coordinate_at(point.x(), point.y()))
    }

    fn last_known_location(&self) -> Option<Location> {
        self.location
    }

    fn resolve_icon(&self, name: &str) -> bool {
        self.icons.iter().any(|icon| icon == name)
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn replace_markers(&mut self, markers: Vec<Marker>) {
        self.replace_calls += 1;
        self.markers = markers;
    }

    fn set_puck_enabled(&mut self, enabled: bool) {
        self.puck_enabled = enabled;
    }

    fn start_location_updates(&mut self) -> Result<(), MapScreenError> {
        if let Some(err) = &self.start_error {
            return Err(err.clone().into());
        }

        self.updates_started = true;
        Ok(())
    }

    fn stop_location_updates(&mut self) {
        self.updates_started = false;
    }
}

/// Style selector remembering its options and selection.
#[derive(Default)]
pub struct RecordingSelector {
    pub options: Vec<StyleOption>,
    pub selected: Option<u32>,
}

impl StyleSelector for RecordingSelector {
    fn set_options(&mut self, options: &[StyleOption]) {
        self.options = options.to_vec();
    }

    fn selected(&self) -> Option<u32> {
        self.selected
    }

    fn select(&mut self, tag: u32) {
        self.selected = Some(tag);
    }

    fn clear_selection(&mut self) {
        self.selected = None;
    }
}
