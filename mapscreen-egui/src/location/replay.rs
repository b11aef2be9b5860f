use std::time::Duration;

use async_trait::async_trait;
use galileo_types::latlon;
use mapscreen::Location;

use super::{LocationMessage, LocationProvider, LocationSink};
use crate::config::TrackPoint;

pub(super) fn to_location(point: &TrackPoint) -> Location {
    let location = Location::new(latlon!(point.lat, point.lon));
    match point.accuracy {
        Some(accuracy) => location.with_accuracy(accuracy),
        None => location,
    }
}

/// Copy of the fix taken now.
fn restamp(location: &Location) -> Location {
    let mut fresh = Location::new(location.coordinate());
    if let Some(accuracy) = location.accuracy() {
        fresh = fresh.with_accuracy(accuracy);
    }
    if let Some(heading) = location.heading() {
        fresh = fresh.with_heading(heading);
    }

    fresh
}

/// Reports one location and finishes.
pub struct FixedLocationProvider {
    location: Location,
}

impl FixedLocationProvider {
    /// Creates a new provider.
    pub fn new(location: Location) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn run(&self, sink: LocationSink) {
        sink.send(LocationMessage::Update(restamp(&self.location)));
    }
}

/// Replays a recorded track, one point per interval.
pub struct ReplayLocationProvider {
    track: Vec<Location>,
    interval: Duration,
    repeat: bool,
}

impl ReplayLocationProvider {
    /// Creates a provider that plays the track once.
    pub fn new(track: Vec<Location>, interval: Duration) -> Self {
        Self {
            track,
            interval,
            repeat: false,
        }
    }

    /// Plays the track in a loop.
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

#[async_trait]
impl LocationProvider for ReplayLocationProvider {
    async fn run(&self, sink: LocationSink) {
        if self.track.is_empty() {
            return;
        }

        loop {
            for (index, point) in self.track.iter().enumerate() {
                if index > 0 || self.repeat {
                    tokio::time::sleep(self.interval).await;
                }

                if !sink.send(LocationMessage::Update(restamp(point))) {
                    return;
                }
            }

            if !self.repeat {
                log::debug!("Replay of {} points finished", self.track.len());
                return;
            }
        }
    }
}
