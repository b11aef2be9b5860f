//! The eframe application of the map screen.

use std::time::Duration;

use egui::{Align2, Color32, CentralPanel, Frame, RichText};
use mapscreen::{MapScreenController, Notice, NoticeLevel};
use web_time::Instant;

use crate::input::{InteractionTracker, LongPressInput, PointerSample};
use crate::location::LocationMessage;
use crate::surface::GalileoSurface;
use crate::tab_bar::TabBar;

/// Controller of the application window.
pub type ScreenController = MapScreenController<GalileoSurface, TabBar>;

/// Shows the newest notice for a limited time.
#[derive(Debug)]
pub struct NoticeBanner {
    current: Option<Notice>,
    lifetime: Duration,
}

impl NoticeBanner {
    /// Creates a banner showing every notice for `lifetime`.
    pub fn new(lifetime: Duration) -> Self {
        Self {
            current: None,
            lifetime,
        }
    }

    /// Replaces the shown notice with the newest of the given ones.
    pub fn push(&mut self, notices: impl IntoIterator<Item = Notice>) {
        if let Some(newest) = notices.into_iter().last() {
            self.current = Some(newest);
        }
    }

    /// The notice to show now, if it has not expired yet.
    pub fn visible(&mut self, now: Instant) -> Option<&Notice> {
        let expired = self.current.as_ref().is_some_and(|notice| {
            now.saturating_duration_since(notice.created()) >= self.lifetime
        });
        if expired {
            self.current = None;
        }

        self.current.as_ref()
    }

    /// Time left until the shown notice expires.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.current.as_ref().map(|notice| {
            self.lifetime
                .saturating_sub(now.saturating_duration_since(notice.created()))
        })
    }

    fn show(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(notice) = self.visible(now) else {
            return;
        };

        let fill = match notice.level() {
            NoticeLevel::Info => Color32::from_rgb(40, 40, 40),
            NoticeLevel::Warning => Color32::from_rgb(160, 110, 0),
            NoticeLevel::Error => Color32::from_rgb(170, 30, 30),
        };
        let message = notice.message().to_owned();

        egui::Area::new(egui::Id::new("notice_banner"))
            .anchor(Align2::CENTER_TOP, [0.0, 12.0])
            .interactable(false)
            .show(ctx, |ui| {
                Frame::default()
                    .fill(fill)
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::same(8))
                    .show(ui, |ui| {
                        ui.label(RichText::new(message).color(Color32::WHITE));
                    });
            });

        if let Some(left) = self.time_left(now) {
            ctx.request_repaint_after(left);
        }
    }
}

/// The map screen window: the map with the tab bar at the bottom and a notice banner on top.
pub struct MapScreenApp {
    controller: ScreenController,
    long_press: LongPressInput,
    interaction: InteractionTracker,
    banner: NoticeBanner,
}

impl MapScreenApp {
    /// Creates the app around an initialized controller.
    ///
    /// `interaction` must be the tracker whose handler was registered with the map widget.
    pub fn new(controller: ScreenController, interaction: InteractionTracker) -> Self {
        let long_press = LongPressInput::new(*controller.config().long_press());
        let banner = NoticeBanner::new(controller.config().notice_lifetime());

        Self {
            controller,
            long_press,
            interaction,
            banner,
        }
    }

    /// The controller of the screen.
    pub fn controller(&self) -> &ScreenController {
        &self.controller
    }

    fn handle_location(&mut self) {
        for message in self.controller.surface_mut().poll_location() {
            match message {
                LocationMessage::Update(location) => self.controller.on_location_update(&location),
                LocationMessage::Error(err) => self.controller.on_location_error(err),
            }
        }
    }
}

impl eframe::App for MapScreenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_location();

        if let Some(tag) = self.controller.selector().show(ctx) {
            self.controller.on_style_selected(tag);
        }

        CentralPanel::default()
            .frame(Frame::default())
            .show(ctx, |ui| {
                let map_rect = ui.available_rect_before_wrap();
                let sample = PointerSample::read(ui, map_rect);

                if self.controller.surface_mut().render(ui) {
                    self.controller.on_map_loaded();
                }

                let now = Instant::now();
                for event in self.long_press.handle(sample, now) {
                    self.controller.on_long_press(&event);
                }

                if let Some(delay) = self.long_press.repaint_after(now) {
                    ctx.request_repaint_after(delay);
                }
            });

        if self.interaction.take() {
            self.controller.on_manual_interaction();
        }

        self.banner.push(self.controller.take_notices());
        self.banner.show(ctx, Instant::now());
    }
}

impl Drop for MapScreenApp {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}
