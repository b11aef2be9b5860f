//! Error types used by the crate.

use thiserror::Error;

use crate::style::StyleUri;

/// Error returned by the map screen operations.
///
/// None of these terminate the screen. The controller logs them and turns them into
/// [`Notice`](crate::Notice)s for the user.
#[derive(Debug, Error)]
pub enum MapScreenError {
    /// The user location is not known yet.
    #[error("user location is not available")]
    LocationUnavailable,
    /// The map surface failed to apply a style.
    #[error("failed to load style {uri}: {reason}")]
    StyleLoad {
        /// Style that was requested.
        uri: StyleUri,
        /// Description of the failure given by the surface.
        reason: String,
    },
    /// No style option with the given tag exists.
    #[error("no style option with tag {0}")]
    UnknownStyle(u32),
    /// The screen point does not correspond to a place on the map (e.g. above the horizon).
    #[error("the pressed point is outside of the map")]
    OutsideMap,
    /// The marker icon could not be resolved by the surface.
    #[error("marker icon '{0}' is not available")]
    IconUnavailable(String),
    /// Location provider failure.
    #[error(transparent)]
    Location(#[from] LocationError),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Error reading configuration from the FS.
    #[error("failed to read file")]
    FsIo(#[from] std::io::Error),
    /// Error parsing configuration.
    #[error("failed to parse configuration")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a location provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user did not allow access to the location.
    #[error("location permission denied")]
    PermissionDenied,
    /// The provider has no position fix.
    #[error("location unavailable: {0}")]
    Unavailable(String),
    /// Connecting to the location source failed or the connection dropped.
    #[error("location source connection failed: {0}")]
    Connection(String),
    /// The location source sent data that could not be understood.
    #[error("location source protocol error: {0}")]
    Protocol(String),
}
