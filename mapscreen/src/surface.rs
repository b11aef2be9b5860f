//! Collaborators of the [`MapScreenController`](crate::MapScreenController).
//!
//! Implementations are expected to live on the UI thread. Anything that happens on other
//! threads (location sensing, tile loading) must be delivered back to the UI thread before it
//! reaches these traits.

use crate::camera::CameraTarget;
use crate::error::MapScreenError;
use crate::location::Location;
use crate::marker::Marker;
use crate::style::{StyleOption, StyleUri};
use crate::{Coordinate, ScreenPoint};

/// The map: renders the basemap, owns the camera, the marker set and location tracking.
pub trait MapSurface {
    /// Current camera position.
    fn camera(&self) -> CameraTarget;

    /// Moves the camera to the target immediately.
    fn set_camera(&mut self, target: &CameraTarget);

    /// Starts an animated flight to the target over [`CameraTarget::duration`]. A new flight
    /// replaces the one in progress.
    fn fly_to(&mut self, target: &CameraTarget);

    /// Style currently shown.
    fn style(&self) -> Option<&StyleUri>;

    /// Switches the basemap to the given style.
    fn set_style(&mut self, uri: &StyleUri) -> Result<(), MapScreenError>;

    /// Geographic coordinate under the given screen point, `None` if the point is not on the map.
    fn coordinate_for(&self, point: ScreenPoint) -> Option<Coordinate>;

    /// The latest location received from the location provider.
    fn last_known_location(&self) -> Option<Location>;

    /// Returns true if the surface can draw the icon with the given name.
    fn resolve_icon(&self, name: &str) -> bool;

    /// Markers currently shown.
    fn markers(&self) -> &[Marker];

    /// Replaces all shown markers with the given ones.
    fn replace_markers(&mut self, markers: Vec<Marker>);

    /// Shows or hides the puck at the user location.
    fn set_puck_enabled(&mut self, enabled: bool);

    /// Starts continuous location updates.
    fn start_location_updates(&mut self) -> Result<(), MapScreenError>;

    /// Stops location updates.
    fn stop_location_updates(&mut self);
}

/// A control showing a fixed list of mutually exclusive options.
pub trait StyleSelector {
    /// Replaces the options shown by the selector.
    fn set_options(&mut self, options: &[StyleOption]);

    /// Tag of the selected option.
    fn selected(&self) -> Option<u32>;

    /// Selects the option with the given tag without notifying anyone.
    fn select(&mut self, tag: u32);

    /// Leaves no option selected.
    fn clear_selection(&mut self);
}
