//! `mapscreen` is the orchestration core of a single map screen: a basemap whose style is switched
//! from a tab bar, a camera that follows the user's location, and a pin dropped on long press.
//!
//! The crate does not render anything. Everything that draws, fetches tiles or senses the device
//! position lives behind two traits the host UI implements:
//!
//! * [`MapSurface`] is the map itself: camera, style, marker set and location tracking.
//! * [`StyleSelector`] is the tab-bar-like control listing the [`StyleOption`]s.
//!
//! The [`MapScreenController`] ties them together. The host calls its `on_*` methods from the UI
//! thread whenever something happens (a tab was clicked, a [`LongPressRecognizer`] emitted an
//! event, a location arrived, the map finished loading), and shows the [`Notice`]s the controller
//! produces instead of failing.
//!
//! ```
//! use mapscreen::{ScreenConfig, StyleTable};
//!
//! let config = ScreenConfig::default();
//! let streets = config.styles().default_option();
//!
//! assert_eq!(streets.label(), "Streets");
//! assert_eq!(config.styles().len(), StyleTable::default().len());
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod camera;
mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod location;
pub mod marker;
pub mod notice;
pub mod style;
pub mod surface;

#[cfg(test)]
pub(crate) mod tests;

pub use camera::CameraTarget;
pub use color::Color;
pub use config::{RecenterPolicy, ScreenConfig};
pub use controller::MapScreenController;
pub use error::{LocationError, MapScreenError};
pub use gesture::{GesturePhase, LongPressConfig, LongPressEvent, LongPressRecognizer};
pub use location::Location;
pub use marker::{Marker, PinIcon};
pub use notice::{Notice, NoticeLevel, NoticeQueue};
pub use style::{StyleOption, StyleTable, StyleUri};
pub use surface::{MapSurface, StyleSelector};

// Reexport galileo_types
pub use galileo_types;

/// Geographic coordinate used throughout the crate.
pub type Coordinate = galileo_types::geo::impls::GeoPoint2d;

/// Position on the map surface in pixels from its top-left corner.
pub type ScreenPoint = galileo_types::cartesian::Point2;
