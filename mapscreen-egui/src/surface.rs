//! [`MapSurface`] implementation on top of the galileo egui widget.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use galileo::layer::{FeatureLayer, Layer};
use galileo::symbol::CirclePointSymbol;
use galileo::{Map, MapBuilder, MapView, Messenger};
use galileo_egui::EguiMapState;
use galileo_types::cartesian::Point2;
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Crs, GeoPoint};
use galileo_types::geometry_type::CartesianSpace2d;
use mapscreen::camera::resolution_to_zoom;
use mapscreen::{
    CameraTarget, Color, Coordinate, Location, MapScreenError, MapSurface, Marker, PinIcon,
    ScreenConfig, ScreenPoint, StyleUri,
};

use crate::basemap::{BasemapCatalog, BasemapLayer};
use crate::location::{LocationFeed, LocationMessage};

const PUCK_COLOR: Color = Color::rgba(0, 122, 255, 255);
const PUCK_SIZE: f64 = 14.0;
const MARKER_SIZE: f64 = 12.0;

/// Fires once, on the first frame the map is drawn with a non-zero size.
#[derive(Debug, Default)]
pub struct LoadSignal {
    fired: bool,
}

impl LoadSignal {
    /// Returns true the first time it is called with a non-empty size.
    pub fn frame_drawn(&mut self, width: f32, height: f32) -> bool {
        if self.fired || width < 1.0 || height < 1.0 {
            return false;
        }

        self.fired = true;
        true
    }

    /// Returns true if the signal has fired.
    pub fn is_fired(&self) -> bool {
        self.fired
    }
}

/// Messenger of the basemap layers.
///
/// The map widget only attaches its own messenger to the layers the map was created with. Tiles
/// loaded by basemap layers added later are flagged here and the widget is redrawn on the next
/// frame.
#[derive(Debug, Clone)]
pub struct TileMessenger {
    loaded: Arc<AtomicBool>,
    context: egui::Context,
}

impl TileMessenger {
    /// Creates a messenger repainting the given context.
    pub fn new(context: egui::Context) -> Self {
        Self {
            loaded: Arc::default(),
            context,
        }
    }

    /// Returns true if a tile was loaded since the last call.
    pub fn take(&self) -> bool {
        self.loaded.swap(false, Ordering::Relaxed)
    }
}

impl Messenger for TileMessenger {
    fn request_redraw(&self) {
        if !self.loaded.swap(true, Ordering::Relaxed) {
            self.context.request_repaint();
        }
    }
}

type PointLayer = FeatureLayer<Point2, Point2, CirclePointSymbol, CartesianSpace2d>;

fn to_galileo_color(color: Color) -> galileo::Color {
    galileo::Color::rgba(color.r(), color.g(), color.b(), color.a())
}

/// Projects a geographic coordinate into the map CRS.
fn project(coordinate: &Coordinate) -> Option<Point2> {
    Crs::EPSG3857
        .get_projection::<GeoPoint2d, Point2>()?
        .project(coordinate)
}

/// Tint of the marker layer. All markers of the screen share one symbol.
fn marker_tint(markers: &[Marker]) -> Color {
    markers
        .iter()
        .find_map(|marker| marker.icon().map(PinIcon::tint))
        .unwrap_or(Color::RED)
}

fn point_layer(coordinates: &[Coordinate], color: Color, size: f64) -> PointLayer {
    let points: Vec<Point2> = coordinates
        .iter()
        .filter_map(|coordinate| {
            let point = project(coordinate);
            if point.is_none() {
                log::warn!(
                    "Cannot project point ({}, {}) to the map",
                    coordinate.lat(),
                    coordinate.lon()
                );
            }
            point
        })
        .collect();

    FeatureLayer::new(
        points,
        CirclePointSymbol::new(to_galileo_color(color), size),
        Crs::EPSG3857,
    )
}

/// Map surface drawn by galileo.
///
/// Layers of the map from bottom to top: the basemap layers of the current style, the location
/// puck and the dropped markers.
pub struct GalileoSurface {
    map: EguiMapState,
    tiles: TileMessenger,
    catalog: BasemapCatalog,
    tile_cache: Option<PathBuf>,
    icons: Vec<String>,
    style: Option<StyleUri>,
    basemap_layers: usize,
    markers: Vec<Marker>,
    puck_enabled: bool,
    location: Option<Location>,
    feed: LocationFeed,
    load_signal: LoadSignal,
}

impl GalileoSurface {
    /// Creates the galileo map for the screen: positioned at the initial camera, without a
    /// basemap, with empty puck and marker layers.
    pub fn create_map(config: &ScreenConfig) -> Map {
        let camera = config.initial_camera();
        MapBuilder::default()
            .with_latlon(camera.center().lat(), camera.center().lon())
            .with_resolution(camera.resolution())
            .with_layer(point_layer(&[], PUCK_COLOR, PUCK_SIZE))
            .with_layer(point_layer(&[], Color::RED, MARKER_SIZE))
            .build()
    }

    /// Wraps a map created by [`create_map`](Self::create_map). `ctx` is the context the map is
    /// shown in.
    pub fn new(
        map: EguiMapState,
        ctx: egui::Context,
        catalog: BasemapCatalog,
        feed: LocationFeed,
    ) -> Self {
        Self {
            map,
            tiles: TileMessenger::new(ctx),
            catalog,
            tile_cache: None,
            icons: vec![PinIcon::default().name().to_owned()],
            style: None,
            basemap_layers: 0,
            markers: vec![],
            puck_enabled: false,
            location: None,
            feed,
            load_signal: LoadSignal::default(),
        }
    }

    /// Caches downloaded tiles in the directory.
    pub fn with_tile_cache(mut self, path: Option<PathBuf>) -> Self {
        self.tile_cache = path;
        self
    }

    /// Sets the names of the icons markers can use.
    pub fn with_icons(mut self, icons: Vec<String>) -> Self {
        self.icons = icons;
        self
    }

    /// Renders the map into the remaining space of the `ui`.
    ///
    /// Returns true once, for the first frame the map was drawn with a non-zero size.
    pub fn render(&mut self, ui: &mut egui::Ui) -> bool {
        let size = ui.available_size();
        if self.tiles.take() {
            self.map.request_redraw();
        }

        self.map.render(ui);
        self.load_signal.frame_drawn(size.x, size.y)
    }

    /// Takes the messages of the location provider. Updates the last known location and the puck.
    pub fn poll_location(&mut self) -> Vec<LocationMessage> {
        let messages = self.feed.poll();
        let latest = messages.iter().rev().find_map(|message| match message {
            LocationMessage::Update(location) if location.is_valid() => Some(*location),
            _ => None,
        });

        if let Some(location) = latest {
            self.location = Some(location);
            self.update_puck();
        }

        messages
    }

    fn puck_index(&self) -> usize {
        self.basemap_layers
    }

    fn marker_index(&self) -> usize {
        self.basemap_layers + 1
    }

    fn replace_layer(&mut self, index: usize, layer: impl Layer + 'static) {
        let layers = self.map.map_mut().layers_mut();
        layers.remove(index);
        layers.insert(index, layer);
        self.map.request_redraw();
    }

    fn update_puck(&mut self) {
        let coordinates: Vec<Coordinate> = self
            .location
            .filter(|_| self.puck_enabled)
            .map(|location| location.coordinate())
            .into_iter()
            .collect();
        let layer = point_layer(&coordinates, PUCK_COLOR, PUCK_SIZE);
        self.replace_layer(self.puck_index(), layer);
    }

    fn update_markers(&mut self) {
        let coordinates: Vec<Coordinate> = self.markers.iter().map(Marker::coordinate).collect();
        let layer = point_layer(&coordinates, marker_tint(&self.markers), MARKER_SIZE);
        self.replace_layer(self.marker_index(), layer);
    }

    fn build_basemap_layers(&self, uri: &StyleUri) -> Result<Vec<BasemapLayer>, MapScreenError> {
        let cache = self.tile_cache.as_deref();
        self.catalog
            .resolve(uri)?
            .iter()
            .map(|source| {
                BasemapLayer::build(source, cache, self.tiles.clone()).map_err(|err| {
                    MapScreenError::StyleLoad {
                        uri: uri.clone(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect()
    }

    fn view_for(&self, target: &CameraTarget) -> MapView {
        let mut view = self
            .map
            .map()
            .view()
            .with_position(&target.center())
            .with_resolution(target.resolution());

        if let Some(bearing) = target.bearing() {
            view = view.with_rotation_z(bearing.to_radians());
        }

        if let Some(pitch) = target.pitch() {
            view = view.with_rotation_x(pitch.to_radians());
        }

        view
    }
}

impl MapSurface for GalileoSurface {
    fn camera(&self) -> CameraTarget {
        let view = self.map.map().view();
        let center = view
            .position()
            .unwrap_or_else(|| galileo_types::latlon!(0.0, 0.0));

        CameraTarget::new(center, resolution_to_zoom(view.resolution()))
            .with_bearing(view.rotation_z().to_degrees())
            .with_pitch(view.rotation_x().to_degrees())
    }

    fn set_camera(&mut self, target: &CameraTarget) {
        let view = self.view_for(target);
        self.map.map_mut().set_view(view);
        self.map.request_redraw();
    }

    fn fly_to(&mut self, target: &CameraTarget) {
        if target.is_immediate() {
            self.set_camera(target);
            return;
        }

        let view = self.view_for(target);
        self.map.map_mut().animate_to(view, target.duration());
        self.map.request_redraw();
    }

    fn style(&self) -> Option<&StyleUri> {
        self.style.as_ref()
    }

    fn set_style(&mut self, uri: &StyleUri) -> Result<(), MapScreenError> {
        let new_layers = self.build_basemap_layers(uri)?;

        let layers = self.map.map_mut().layers_mut();
        for _ in 0..self.basemap_layers {
            layers.remove(0);
        }

        self.basemap_layers = new_layers.len();
        for (index, layer) in new_layers.into_iter().enumerate() {
            layers.insert(index, layer);
        }

        self.map.request_redraw();
        self.style = Some(uri.clone());

        log::debug!("Basemap switched to {uri} ({} layers)", self.basemap_layers);
        Ok(())
    }

    fn coordinate_for(&self, point: ScreenPoint) -> Option<Coordinate> {
        self.map.map().view().screen_to_map_geo(point)
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
        self.markers = markers;
        self.update_markers();
    }

    fn set_puck_enabled(&mut self, enabled: bool) {
        self.puck_enabled = enabled;
        self.update_puck();
    }

    fn start_location_updates(&mut self) -> Result<(), MapScreenError> {
        self.feed.start().map_err(MapScreenError::from)
    }

    fn stop_location_updates(&mut self) {
        self.feed.stop();
    }
}
