//! Map screen application on top of the [galileo](https://docs.rs/galileo) egui widget.
//!
//! This crate provides the concrete collaborators of the [`mapscreen`] controller:
//!
//! * [`GalileoSurface`] draws raster basemaps from the [`BasemapCatalog`], the location puck and
//!   the dropped pin with galileo;
//! * [`TabBar`] is the bottom bar used to pick the basemap style or locate the user;
//! * [`location`] providers feed device locations from gpsd, a fixed point or a replayed track;
//! * [`MapScreenApp`] is the eframe application gluing them together.
//!
//! Run the `mapscreen` binary, or call [`init::run`] with an [`AppConfig`].

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod app;
pub mod basemap;
pub mod config;
pub mod init;
pub mod input;
pub mod location;
pub mod surface;
mod tab_bar;

pub use app::MapScreenApp;
pub use basemap::{BasemapCatalog, BasemapEntry, TileSource};
pub use config::{AppConfig, LocationSourceConfig};
pub use surface::GalileoSurface;
pub use tab_bar::{icon_glyph, TabBar};
