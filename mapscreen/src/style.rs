//! Basemap styles and the table of tab bar options.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::MapScreenError;

/// Identifier of a basemap style.
///
/// What the identifier means is up to the [`MapSurface`](crate::MapSurface). The crate never
/// validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleUri(String);

impl StyleUri {
    /// Street map style.
    pub const STREETS: &'static str = "mapscreen://styles/streets";
    /// Satellite imagery style.
    pub const SATELLITE: &'static str = "mapscreen://styles/satellite";
    /// Satellite imagery with streets and labels on top.
    pub const HYBRID: &'static str = "mapscreen://styles/hybrid";

    /// Creates a new style identifier.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The identifier as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StyleUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StyleUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One entry of the style selector.
///
/// An option with a style URI selects a basemap. An option without one is an action (e.g.
/// "Locate Me") that does not change the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOption {
    label: String,
    icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style_uri: Option<StyleUri>,
    tag: u32,
}

impl StyleOption {
    /// Creates an option that switches the map to the given style.
    pub fn style(tag: u32, label: impl Into<String>, icon: impl Into<String>, uri: StyleUri) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
            style_uri: Some(uri),
            tag,
        }
    }

    /// Creates an action option.
    pub fn action(tag: u32, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
            style_uri: None,
            tag,
        }
    }

    /// Text shown under the icon.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the icon of the option.
    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Style the option selects, `None` for actions.
    pub fn style_uri(&self) -> Option<&StyleUri> {
        self.style_uri.as_ref()
    }

    /// Tag reported by the selector when the option is chosen.
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns true if the option is an action rather than a style.
    pub fn is_action(&self) -> bool {
        self.style_uri.is_none()
    }
}

/// Ordered list of options shown by the style selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    options: Vec<StyleOption>,
    default_tag: u32,
}

/// Tag of the "Locate Me" action in the default table.
pub const LOCATE_ME_TAG: u32 = 3;

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            options: vec![
                StyleOption::style(0, "Streets", "map", StyleUri::new(StyleUri::STREETS)),
                StyleOption::style(1, "Satellite", "globe", StyleUri::new(StyleUri::SATELLITE)),
                StyleOption::style(2, "Hybrid", "globe-americas", StyleUri::new(StyleUri::HYBRID)),
                StyleOption::action(LOCATE_ME_TAG, "Locate Me", "location"),
            ],
            default_tag: 0,
        }
    }
}

impl StyleTable {
    /// Creates a new table and checks that it is usable.
    pub fn new(options: Vec<StyleOption>, default_tag: u32) -> Result<Self, MapScreenError> {
        let table = Self {
            options,
            default_tag,
        };
        table.validate()?;

        Ok(table)
    }

    /// Checks that the table has unique tags and that the default option is a style.
    pub fn validate(&self) -> Result<(), MapScreenError> {
        if self.options.is_empty() {
            return Err(MapScreenError::Config("style table is empty".into()));
        }

        let mut tags = HashSet::new();
        for option in &self.options {
            if !tags.insert(option.tag) {
                return Err(MapScreenError::Config(format!(
                    "duplicate style option tag {}",
                    option.tag
                )));
            }
        }

        match self.get(self.default_tag) {
            Some(option) if !option.is_action() => Ok(()),
            Some(_) => Err(MapScreenError::Config(format!(
                "default option {} is an action",
                self.default_tag
            ))),
            None => Err(MapScreenError::UnknownStyle(self.default_tag)),
        }
    }

    /// All options in display order.
    pub fn options(&self) -> &[StyleOption] {
        &self.options
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the table has no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Option with the given tag.
    pub fn get(&self, tag: u32) -> Option<&StyleOption> {
        self.options.iter().find(|option| option.tag == tag)
    }

    /// Tag of the option selected at startup.
    pub fn default_tag(&self) -> u32 {
        self.default_tag
    }

    /// Option selected at startup.
    ///
    /// # Panics
    ///
    /// Panics if the table was deserialized without validation and the default tag is missing.
    pub fn default_option(&self) -> &StyleOption {
        self.get(self.default_tag)
            .expect("style table must contain its default option")
    }

    /// Tag of the style option that selects the given URI.
    pub fn tag_for(&self, uri: &StyleUri) -> Option<u32> {
        self.options
            .iter()
            .find(|option| option.style_uri.as_ref() == Some(uri))
            .map(|option| option.tag)
    }
}
