//! Bottom tab bar picking the basemap style.

use egui::{RichText, TopBottomPanel};
use mapscreen::{StyleOption, StyleSelector};

const TAB_BAR_ID: &str = "style_tab_bar";

/// Glyph shown above the label of a tab.
pub fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "map" => "🗺",
        "globe" => "🌐",
        "globe-americas" => "🌎",
        "location" | "location-arrow" => "📍",
        _ => "⬜",
    }
}

/// Bottom bar with one tab per style option.
#[derive(Debug, Default)]
pub struct TabBar {
    options: Vec<StyleOption>,
    selected: Option<u32>,
}

impl TabBar {
    /// Creates an empty tab bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options shown by the bar.
    pub fn options(&self) -> &[StyleOption] {
        &self.options
    }

    /// Draws the bar at the bottom of the window. Returns the tag of the tab clicked this frame.
    ///
    /// Clicking does not change the selection: the owner decides what to select in response.
    pub fn show(&self, ctx: &egui::Context) -> Option<u32> {
        if self.options.is_empty() {
            return None;
        }

        let mut clicked = None;
        TopBottomPanel::bottom(TAB_BAR_ID).show(ctx, |ui| {
            ui.add_space(4.0);
            ui.columns(self.options.len(), |columns| {
                for (column, option) in columns.iter_mut().zip(&self.options) {
                    column.vertical_centered(|ui| {
                        let is_selected = self.selected == Some(option.tag());
                        let text = RichText::new(format!(
                            "{}\n{}",
                            icon_glyph(option.icon()),
                            option.label()
                        ));

                        if ui.selectable_label(is_selected, text).clicked() {
                            clicked = Some(option.tag());
                        }
                    });
                }
            });
            ui.add_space(4.0);
        });

        if let Some(tag) = clicked {
            log::debug!("Tab {tag} clicked");
        }

        clicked
    }
}

impl StyleSelector for TabBar {
    fn set_options(&mut self, options: &[StyleOption]) {
        self.options = options.to_vec();
        if self
            .selected
            .is_some_and(|tag| !self.options.iter().any(|option| option.tag() == tag))
        {
            self.selected = None;
        }
    }

    fn selected(&self) -> Option<u32> {
        self.selected
    }

    fn select(&mut self, tag: u32) {
        if self.options.iter().any(|option| option.tag() == tag) {
            self.selected = Some(tag);
        } else {
            log::warn!("Cannot select tab {tag}: no such option");
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
    }
}
