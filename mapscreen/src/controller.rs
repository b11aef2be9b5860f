//! The map screen controller.

use crate::camera::CameraTarget;
use crate::config::{RecenterPolicy, ScreenConfig};
use crate::error::{LocationError, MapScreenError};
use crate::gesture::{GesturePhase, LongPressEvent};
use crate::location::Location;
use crate::marker::Marker;
use crate::notice::{Notice, NoticeLevel, NoticeQueue};
use crate::style::StyleUri;
use crate::surface::{MapSurface, StyleSelector};
use crate::Coordinate;

/// Translates UI events into [`MapSurface`] operations.
///
/// The controller is driven by the host from the UI thread:
///
/// * [`initialize`](Self::initialize) once, when the screen is set up;
/// * [`on_style_selected`](Self::on_style_selected) when the user picks a tab;
/// * [`on_long_press`](Self::on_long_press) for every event of the long press recognizer;
/// * [`on_location_update`](Self::on_location_update) and
///   [`on_location_error`](Self::on_location_error) for messages of the location provider;
/// * [`on_map_loaded`](Self::on_map_loaded) when the map has been rendered for the first time;
/// * [`on_manual_interaction`](Self::on_manual_interaction) when the user pans or zooms the map.
///
/// Failures never stop the screen. They are logged and queued as [`Notice`]s, which the host
/// collects with [`take_notices`](Self::take_notices).
pub struct MapScreenController<S, T> {
    surface: S,
    selector: T,
    config: ScreenConfig,
    active_style: Option<u32>,
    map_loaded: bool,
    pending_center: bool,
    manual_interaction: bool,
    notices: NoticeQueue,
}

impl<S: MapSurface, T: StyleSelector> MapScreenController<S, T> {
    /// Creates a new controller. Nothing is done to the collaborators until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(surface: S, selector: T, config: ScreenConfig) -> Self {
        Self {
            surface,
            selector,
            config,
            active_style: None,
            map_loaded: false,
            pending_center: false,
            manual_interaction: false,
            notices: NoticeQueue::default(),
        }
    }

    /// Sets up the surface and the selector.
    ///
    /// Moves the camera to the initial position, fills the selector, selects and applies the
    /// default style, shows the location puck and starts location updates.
    ///
    /// Only an invalid configuration is returned as an error. A style that fails to load or a
    /// location provider that fails to start are reported as notices.
    pub fn initialize(&mut self) -> Result<(), MapScreenError> {
        self.config.validate()?;

        let camera = *self.config.initial_camera();
        self.surface.set_camera(&camera);

        self.selector.set_options(self.config.styles().options());
        let default_tag = self.config.styles().default_tag();
        self.selector.select(default_tag);

        if let Some(uri) = self.style_uri_for(default_tag) {
            match self.surface.set_style(&uri) {
                Ok(()) => self.active_style = Some(default_tag),
                Err(err) => {
                    // Nothing is shown, so no option stays selected.
                    self.sync_selection();
                    self.report(err);
                }
            }
        }

        self.surface.set_puck_enabled(true);
        if let Err(err) = self.surface.start_location_updates() {
            self.report(err);
        }

        log::info!(
            "Map screen initialized with style {:?}",
            self.surface.style().map(StyleUri::as_str)
        );

        Ok(())
    }

    /// The map finished loading. Only the first call has an effect.
    ///
    /// Flies to the last known location. If there is none yet, the flight is deferred to the
    /// first location update.
    pub fn on_map_loaded(&mut self) {
        if self.map_loaded {
            log::debug!("Map loaded event received again, ignoring");
            return;
        }

        self.map_loaded = true;
        match self.surface.last_known_location() {
            Some(location) => self.fly_to_location(&location, self.config.follow_duration()),
            None => {
                log::info!("Map loaded before the location is known, centering on first fix");
                self.pending_center = true;
                self.report(MapScreenError::LocationUnavailable);
            }
        }
    }

    /// The user picked an option of the style selector.
    ///
    /// Style options switch the map style, action options center the map on the user location.
    /// Unknown tags are ignored.
    pub fn on_style_selected(&mut self, tag: u32) {
        let Some(option) = self.config.styles().get(tag) else {
            log::debug!("Ignoring selection of unknown style option {tag}");
            return;
        };

        match option.style_uri().cloned() {
            Some(uri) => {
                if let Err(err) = self.change_style(&uri) {
                    self.report(err);
                }
            }
            None => {
                if let Err(err) = self.center_on_user_location() {
                    self.report(err);
                }

                // Actions are momentary, the selection stays on the active style.
                self.sync_selection();
            }
        }
    }

    /// Sets the map style.
    ///
    /// Only styles of the selector options can be set. If the style is not one of them or the
    /// surface fails to apply it, [`MapScreenError::StyleLoad`] is returned and the selector is
    /// returned to the style that is still shown.
    pub fn change_style(&mut self, uri: &StyleUri) -> Result<(), MapScreenError> {
        let Some(tag) = self.config.styles().tag_for(uri) else {
            self.sync_selection();
            return Err(MapScreenError::StyleLoad {
                uri: uri.clone(),
                reason: "style is not one of the selector options".into(),
            });
        };

        log::debug!("Changing map style to {uri}");
        let result = self.surface.set_style(uri);
        if result.is_ok() {
            self.active_style = Some(tag);
        }

        self.sync_selection();
        result
    }

    /// Flies the camera to the last known user location.
    ///
    /// Returns [`MapScreenError::LocationUnavailable`] without touching the camera if the
    /// location is not known.
    pub fn center_on_user_location(&mut self) -> Result<(), MapScreenError> {
        let location = self
            .surface
            .last_known_location()
            .ok_or(MapScreenError::LocationUnavailable)?;

        if self.manual_interaction {
            log::debug!("Resuming following the user location");
        }
        self.manual_interaction = false;
        self.fly_to_location(&location, self.config.locate_duration());

        Ok(())
    }

    /// Event of the long press recognizer. A marker is placed when the press is recognized, all
    /// other phases are ignored.
    pub fn on_long_press(&mut self, event: &LongPressEvent) {
        if event.phase != GesturePhase::Began {
            return;
        }

        let Some(coordinate) = self.surface.coordinate_for(event.position) else {
            self.report(MapScreenError::OutsideMap);
            return;
        };

        self.place_marker(coordinate);
    }

    /// Replaces all markers on the map with a single one at the coordinate.
    ///
    /// If the surface cannot draw the configured icon, the marker is placed with the default look.
    pub fn place_marker(&mut self, coordinate: Coordinate) -> Marker {
        let icon = self.config.marker_icon();
        let marker = if self.surface.resolve_icon(icon.name()) {
            Marker::new(coordinate).with_icon(icon.clone())
        } else {
            let name = icon.name().to_owned();
            self.report(MapScreenError::IconUnavailable(name));
            Marker::new(coordinate)
        };

        self.surface.replace_markers(vec![marker.clone()]);
        marker
    }

    /// A new location was received.
    ///
    /// With [`RecenterPolicy::Always`] the camera flies to every location. A flight deferred by
    /// [`on_map_loaded`](Self::on_map_loaded) is always done.
    pub fn on_location_update(&mut self, location: &Location) {
        if !location.is_valid() {
            log::warn!("Ignoring invalid location {:?}", location.coordinate());
            return;
        }

        let pending = std::mem::take(&mut self.pending_center);
        if pending || self.is_following() {
            self.fly_to_location(location, self.config.follow_duration());
        } else {
            log::trace!("Not following location update after manual interaction");
        }
    }

    /// The location provider failed.
    pub fn on_location_error(&mut self, error: LocationError) {
        self.report(MapScreenError::Location(error));
    }

    /// The user moved or zoomed the map.
    pub fn on_manual_interaction(&mut self) {
        if !self.manual_interaction
            && self.config.recenter_policy() == RecenterPolicy::PauseAfterInteraction
        {
            log::debug!("Pausing following the user location after manual interaction");
        }

        self.manual_interaction = true;
    }

    /// Stops location updates. Called when the screen goes away.
    pub fn shutdown(&mut self) {
        self.surface.stop_location_updates();
    }

    /// Returns true if the camera follows location updates.
    pub fn is_following(&self) -> bool {
        match self.config.recenter_policy() {
            RecenterPolicy::Always => true,
            RecenterPolicy::PauseAfterInteraction => !self.manual_interaction,
        }
    }

    /// Returns true after the first [`on_map_loaded`](Self::on_map_loaded) call.
    pub fn is_map_loaded(&self) -> bool {
        self.map_loaded
    }

    /// Tag of the style that is shown.
    pub fn active_style(&self) -> Option<u32> {
        self.active_style
    }

    /// Queued notices.
    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Removes and returns queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Configuration of the controller.
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// The map surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable reference to the map surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The style selector.
    pub fn selector(&self) -> &T {
        &self.selector
    }

    /// Mutable reference to the style selector.
    pub fn selector_mut(&mut self) -> &mut T {
        &mut self.selector
    }

    fn style_uri_for(&self, tag: u32) -> Option<StyleUri> {
        self.config.styles().get(tag)?.style_uri().cloned()
    }

    fn sync_selection(&mut self) {
        if self.selector.selected() == self.active_style {
            return;
        }

        match self.active_style {
            Some(tag) => self.selector.select(tag),
            None => self.selector.clear_selection(),
        }
    }

    fn fly_to_location(&mut self, location: &Location, duration: std::time::Duration) {
        let target = CameraTarget::new(location.coordinate(), self.config.locate_zoom())
            .with_duration(duration);
        self.surface.fly_to(&target);
    }

    fn report(&mut self, error: MapScreenError) {
        let notice = Notice::from(&error);
        match notice.level() {
            NoticeLevel::Info => log::info!("{error}"),
            NoticeLevel::Warning => log::warn!("{error}"),
            NoticeLevel::Error => log::error!("{error}"),
        }

        self.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use galileo_types::geo::GeoPoint;
    use galileo_types::latlon;

    use super::*;
    use crate::style::LOCATE_ME_TAG;
    use crate::tests::{RecordingSelector, RecordingSurface};
    use crate::ScreenPoint;

    type TestController = MapScreenController<RecordingSurface, RecordingSelector>;

    fn controller_with(surface: RecordingSurface, config: ScreenConfig) -> TestController {
        let mut controller = MapScreenController::new(surface, RecordingSelector::default(), config);
        controller.initialize().unwrap();
        controller.take_notices();
        controller
    }

    fn controller() -> TestController {
        controller_with(RecordingSurface::default(), ScreenConfig::default())
    }

    fn began(x: f64, y: f64) -> LongPressEvent {
        LongPressEvent {
            phase: GesturePhase::Began,
            position: ScreenPoint::new(x, y),
        }
    }

    #[test]
    fn initial_state_is_streets() {
        let controller = controller();

        assert_eq!(controller.active_style(), Some(0));
        assert_eq!(controller.selector().selected(), Some(0));
        assert_eq!(controller.selector().options.len(), 4);
        assert_eq!(controller.selector().options[0].label(), "Streets");
        assert_eq!(
            controller.surface().style().map(StyleUri::as_str),
            Some(StyleUri::STREETS)
        );

        let surface = controller.surface();
        assert!(surface.puck_enabled);
        assert!(surface.updates_started);
        assert!(surface.flights.is_empty());
        assert_eq!(surface.set_camera_calls.len(), 1);
        assert_relative_eq!(surface.set_camera_calls[0].center().lat(), 39.5);
        assert_eq!(surface.set_camera_calls[0].zoom(), 2.0);
    }

    #[test]
    fn selecting_a_style_option_applies_its_uri() {
        let mut controller = controller();
        let table = controller.config().styles().clone();

        for tag in [0, 1, 2, 1, 0, 2] {
            controller.on_style_selected(tag);
            let expected = table.get(tag).unwrap().style_uri().unwrap();
            assert_eq!(controller.surface().style(), Some(expected));
            assert_eq!(controller.active_style(), Some(tag));
        }

        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn locate_me_flies_to_known_location() {
        let mut surface = RecordingSurface::default();
        surface.location = Some(Location::new(latlon!(52.52, 13.405)));
        let mut controller = controller_with(surface, ScreenConfig::default());
        controller.on_style_selected(1);

        controller.on_style_selected(LOCATE_ME_TAG);

        let flights = &controller.surface().flights;
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].center(), latlon!(52.52, 13.405));
        assert_eq!(flights[0].zoom(), 14.0);
        assert_eq!(flights[0].duration(), Duration::from_secs(1));

        // The action does not stay selected.
        assert_eq!(controller.selector().selected(), Some(1));
        assert_eq!(controller.active_style(), Some(1));
    }

    #[test]
    fn locate_me_without_location_reports_info() {
        let mut controller = controller();

        controller.on_style_selected(LOCATE_ME_TAG);

        assert!(controller.surface().flights.is_empty());
        assert_eq!(controller.surface().set_camera_calls.len(), 1);
        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Info);
        assert_eq!(controller.selector().selected(), Some(0));
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let mut controller = controller();
        let calls_before = controller.surface().style_calls.len();

        controller.on_style_selected(42);

        assert_eq!(controller.surface().style_calls.len(), calls_before);
        assert!(controller.surface().flights.is_empty());
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn failed_style_keeps_previous_selection() {
        let mut surface = RecordingSurface::default();
        surface.failing_styles.insert(StyleUri::SATELLITE.to_owned());
        let mut controller = controller_with(surface, ScreenConfig::default());
        controller.on_style_selected(2);

        // Emulate the selector that changed its selection on click.
        controller.selector_mut().select(1);
        controller.on_style_selected(1);

        assert_eq!(
            controller.surface().style().map(StyleUri::as_str),
            Some(StyleUri::HYBRID)
        );
        assert_eq!(controller.active_style(), Some(2));
        assert_eq!(controller.selector().selected(), Some(2));

        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Error);
    }

    #[test]
    fn styles_without_option_are_rejected() {
        let mut controller = controller();
        let calls_before = controller.surface().style_calls.len();

        let result = controller.change_style(&StyleUri::new("https://x.example.com/{z}/{x}/{y}.png"));

        assert_matches!(result, Err(MapScreenError::StyleLoad { .. }));
        assert_eq!(controller.surface().style_calls.len(), calls_before);
        assert_eq!(
            controller.surface().style().map(StyleUri::as_str),
            Some(StyleUri::STREETS)
        );
        assert_eq!(controller.active_style(), Some(0));
        assert_eq!(controller.selector().selected(), Some(0));
    }

    #[test]
    fn change_style_selects_the_matching_option() {
        let mut controller = controller();

        controller
            .change_style(&StyleUri::new(StyleUri::HYBRID))
            .unwrap();

        assert_eq!(controller.active_style(), Some(2));
        assert_eq!(controller.selector().selected(), Some(2));
    }

    #[test]
    fn failed_default_style_leaves_nothing_selected() {
        let mut surface = RecordingSurface::default();
        surface.failing_styles.insert(StyleUri::STREETS.to_owned());
        surface.location = Some(Location::new(latlon!(52.52, 13.405)));
        let mut controller =
            MapScreenController::new(surface, RecordingSelector::default(), ScreenConfig::default());

        controller.initialize().unwrap();
        assert_eq!(controller.take_notices()[0].level(), NoticeLevel::Error);
        assert_eq!(controller.active_style(), None);
        assert_eq!(controller.surface().style(), None);
        assert_eq!(controller.selector().selected(), None);

        controller.selector_mut().select(LOCATE_ME_TAG);
        controller.on_style_selected(LOCATE_ME_TAG);
        assert_eq!(controller.surface().flights.len(), 1);
        assert_eq!(controller.selector().selected(), None);

        // Picking a working style recovers.
        controller.on_style_selected(1);
        assert_eq!(controller.active_style(), Some(1));
        assert_eq!(controller.selector().selected(), Some(1));
    }

    #[test]
    fn long_press_places_marker_only_on_began() {
        let mut controller = controller();

        controller.on_long_press(&began(100.0, 200.0));
        for (phase, x, y) in [
            (GesturePhase::Changed, 110.0, 210.0),
            (GesturePhase::Changed, 120.0, 220.0),
            (GesturePhase::Ended, 130.0, 230.0),
        ] {
            controller.on_long_press(&LongPressEvent {
                phase,
                position: ScreenPoint::new(x, y),
            });
        }

        let surface = controller.surface();
        assert_eq!(surface.replace_calls, 1);
        assert_eq!(surface.markers().len(), 1);
        assert_eq!(
            surface.markers()[0].coordinate(),
            RecordingSurface::coordinate_at(100.0, 200.0)
        );
        assert_eq!(surface.markers()[0].icon().unwrap().name(), "pin");
    }

    #[test]
    fn markers_are_replaced_not_accumulated() {
        let mut controller = controller();

        let a = latlon!(10.0, 20.0);
        let b = latlon!(-5.0, 7.5);
        controller.place_marker(a);
        controller.place_marker(b);

        let markers = controller.surface().markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].coordinate(), b);
    }

    #[test]
    fn missing_icon_places_default_marker() {
        let mut surface = RecordingSurface::default();
        surface.icons.clear();
        let mut controller = controller_with(surface, ScreenConfig::default());

        let marker = controller.place_marker(latlon!(1.0, 2.0));

        assert!(marker.icon().is_none());
        assert_eq!(controller.surface().markers(), &[marker]);
        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Warning);
    }

    #[test]
    fn press_outside_map_is_reported() {
        let mut controller = controller();

        controller.on_long_press(&began(10.0, -1.0));

        assert!(controller.surface().markers().is_empty());
        assert_eq!(controller.take_notices().len(), 1);
    }

    #[test]
    fn every_location_update_flies_to_it() {
        let mut controller = controller();
        let points = [latlon!(1.0, 1.0), latlon!(1.001, 1.0), latlon!(1.002, 1.001)];

        for (i, point) in points.iter().enumerate() {
            controller.on_location_update(&Location::new(*point));

            let flights = &controller.surface().flights;
            assert_eq!(flights.len(), i + 1);
            let last = flights[i];
            assert_eq!(last.center(), *point);
            assert_eq!(last.zoom(), 14.0);
            assert_eq!(last.duration(), Duration::from_secs(2));
        }
    }

    #[test]
    fn invalid_location_is_ignored() {
        let mut controller = controller();

        controller.on_location_update(&Location::new(latlon!(95.0, 0.0)));

        assert!(controller.surface().flights.is_empty());
    }

    #[test]
    fn map_loaded_flies_to_known_location_once() {
        let mut surface = RecordingSurface::default();
        surface.location = Some(Location::new(latlon!(48.85, 2.35)));
        let mut controller = controller_with(surface, ScreenConfig::default());

        controller.on_map_loaded();
        controller.on_map_loaded();

        let flights = &controller.surface().flights;
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].center(), latlon!(48.85, 2.35));
        assert_eq!(flights[0].duration(), Duration::from_secs(2));
        assert!(controller.is_map_loaded());
    }

    #[test]
    fn map_loaded_without_location_defers_flight() {
        let config =
            ScreenConfig::default().with_recenter_policy(RecenterPolicy::PauseAfterInteraction);
        let mut controller = controller_with(RecordingSurface::default(), config);

        controller.on_map_loaded();
        assert!(controller.surface().flights.is_empty());
        assert_eq!(controller.take_notices()[0].level(), NoticeLevel::Info);

        // The deferred flight happens even if following is paused.
        controller.on_manual_interaction();
        controller.on_location_update(&Location::new(latlon!(35.68, 139.69)));
        assert_eq!(controller.surface().flights.len(), 1);

        controller.on_location_update(&Location::new(latlon!(35.69, 139.69)));
        assert_eq!(controller.surface().flights.len(), 1);
    }

    #[test]
    fn manual_interaction_pauses_following_until_locate_me() {
        let config =
            ScreenConfig::default().with_recenter_policy(RecenterPolicy::PauseAfterInteraction);
        let mut controller = controller_with(RecordingSurface::default(), config);

        controller.on_location_update(&Location::new(latlon!(1.0, 1.0)));
        controller.on_manual_interaction();
        assert!(!controller.is_following());
        controller.on_location_update(&Location::new(latlon!(2.0, 2.0)));
        assert_eq!(controller.surface().flights.len(), 1);

        controller.surface_mut().location = Some(Location::new(latlon!(2.0, 2.0)));
        controller.on_style_selected(LOCATE_ME_TAG);
        assert!(controller.is_following());
        controller.on_location_update(&Location::new(latlon!(3.0, 3.0)));
        assert_eq!(controller.surface().flights.len(), 3);
    }

    #[test]
    fn always_policy_ignores_manual_interaction() {
        let mut controller = controller();

        controller.on_manual_interaction();
        controller.on_location_update(&Location::new(latlon!(1.0, 1.0)));

        assert!(controller.is_following());
        assert_eq!(controller.surface().flights.len(), 1);
    }

    #[test]
    fn location_start_failure_does_not_abort_initialization() {
        let mut surface = RecordingSurface::default();
        surface.start_error = Some(LocationError::PermissionDenied);
        let mut controller =
            MapScreenController::new(surface, RecordingSelector::default(), ScreenConfig::default());

        controller.initialize().unwrap();

        assert_eq!(controller.active_style(), Some(0));
        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Warning);
    }

    #[test]
    fn location_errors_become_notices() {
        let mut controller = controller();

        controller.on_location_error(LocationError::Connection("refused".into()));

        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message().contains("refused"));
    }

    #[test]
    fn shutdown_stops_location_updates() {
        let mut controller = controller();

        controller.shutdown();

        assert!(!controller.surface().updates_started);
    }
}
