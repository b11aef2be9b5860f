//! Sources of the device location.
//!
//! A [`LocationProvider`] runs as a task on the tokio runtime and pushes [`LocationMessage`]s
//! through a [`LocationSink`]. The UI thread owns the receiving end in a [`LocationFeed`] and
//! drains it once per frame.

use std::sync::Arc;

use async_trait::async_trait;
use mapscreen::{Location, LocationError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::config::LocationSourceConfig;

mod gpsd;
mod replay;

pub use gpsd::GpsdLocationProvider;
pub use replay::{FixedLocationProvider, ReplayLocationProvider};

/// Message sent by a location provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationMessage {
    /// New location fix.
    Update(Location),
    /// The provider failed. It may keep running and send updates later.
    Error(LocationError),
}

/// Sending end of a [`LocationFeed`].
#[derive(Debug, Clone)]
pub struct LocationSink {
    sender: UnboundedSender<LocationMessage>,
    repaint: Option<egui::Context>,
}

impl LocationSink {
    /// Sends the message and wakes up the UI. Returns false if the feed was stopped.
    pub fn send(&self, message: LocationMessage) -> bool {
        if self.sender.send(message).is_err() {
            return false;
        }

        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }

        true
    }

    /// Returns true if nobody listens to the messages anymore.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Source of location updates.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Produces locations until done or until the sink is closed.
    async fn run(&self, sink: LocationSink);
}

/// Creates the provider for the configured location source. Returns `None` if location is
/// disabled.
pub fn provider_for(config: &LocationSourceConfig) -> Option<Arc<dyn LocationProvider>> {
    match config {
        LocationSourceConfig::None => None,
        LocationSourceConfig::Fixed(point) => Some(Arc::new(FixedLocationProvider::new(
            replay::to_location(point),
        ))),
        LocationSourceConfig::Replay {
            track,
            interval,
            repeat,
        } => Some(Arc::new(
            ReplayLocationProvider::new(track.iter().map(replay::to_location).collect(), *interval)
                .with_repeat(*repeat),
        )),
        LocationSourceConfig::Gpsd { host, port } => {
            Some(Arc::new(GpsdLocationProvider::new(host.clone(), *port)))
        }
    }
}

/// Receiving end of the location updates, owned by the UI thread.
pub struct LocationFeed {
    provider: Option<Arc<dyn LocationProvider>>,
    runtime: Handle,
    repaint: Option<egui::Context>,
    receiver: Option<UnboundedReceiver<LocationMessage>>,
    task: Option<JoinHandle<()>>,
}

impl LocationFeed {
    /// Creates a stopped feed. Without a provider the location is never available.
    pub fn new(provider: Option<Arc<dyn LocationProvider>>, runtime: Handle) -> Self {
        Self {
            provider,
            runtime,
            repaint: None,
            receiver: None,
            task: None,
        }
    }

    /// Requests a repaint of the given context on every message.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Spawns the provider. Does nothing if it is already running.
    pub fn start(&mut self) -> Result<(), LocationError> {
        let Some(provider) = &self.provider else {
            return Err(LocationError::Unavailable(
                "no location source is configured".into(),
            ));
        };

        if self.is_running() {
            return Ok(());
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = LocationSink {
            sender,
            repaint: self.repaint.clone(),
        };

        let provider = provider.clone();
        self.task = Some(self.runtime.spawn(async move {
            provider.run(sink).await;
            log::debug!("Location provider finished");
        }));
        self.receiver = Some(receiver);

        log::debug!("Location provider started");
        Ok(())
    }

    /// Aborts the provider and drops the messages not yet received.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("Location provider stopped");
        }

        self.receiver = None;
    }

    /// Returns true between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }

    /// Takes all messages received since the last call.
    pub fn poll(&mut self) -> Vec<LocationMessage> {
        let mut messages = vec![];
        if let Some(receiver) = &mut self.receiver {
            while let Ok(message) = receiver.try_recv() {
                messages.push(message);
            }
        }

        messages
    }
}

impl Drop for LocationFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
