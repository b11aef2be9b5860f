//! Long press recognition from raw pointer input.
//!
//! Hosts feed pointer presses, moves and releases into a [`LongPressRecognizer`] together with the
//! time they happened, and call [`LongPressRecognizer::tick`] on every frame while the pointer is
//! down. The recognizer turns them into [`LongPressEvent`]s:
//!
//! 1. The pointer must stay down for [`LongPressConfig::min_duration`] without moving further than
//!    [`LongPressConfig::allowable_movement`] from where it was pressed. Then a
//!    [`GesturePhase::Began`] event is emitted at the current pointer position.
//! 2. Every further move emits [`GesturePhase::Changed`].
//! 3. Releasing emits [`GesturePhase::Ended`], cancelling emits [`GesturePhase::Cancelled`].
//!
//! If the pointer moves too far before the press is recognized, the gesture fails and nothing is
//! emitted until the next press.

use std::time::Duration;

use galileo_types::cartesian::CartesianPoint2d;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::ScreenPoint;

const DEFAULT_MIN_DURATION: Duration = Duration::from_millis(500);
const DEFAULT_ALLOWABLE_MOVEMENT: f64 = 10.0;

/// Phase of a recognized long press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// The press was held long enough to be recognized.
    Began,
    /// The pointer moved while the recognized press is held.
    Changed,
    /// The pointer was released.
    Ended,
    /// The gesture was interrupted (e.g. the pointer left the map or a new press started).
    Cancelled,
}

/// Event emitted by the [`LongPressRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongPressEvent {
    /// Phase of the gesture.
    pub phase: GesturePhase,
    /// Pointer position in screen pixels.
    pub position: ScreenPoint,
}

/// Configuration of a [`LongPressRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPressConfig {
    #[serde(with = "crate::config::seconds")]
    min_duration: Duration,
    allowable_movement: f64,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            allowable_movement: DEFAULT_ALLOWABLE_MOVEMENT,
        }
    }
}

impl LongPressConfig {
    /// How long the pointer must be held down.
    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Sets how long the pointer must be held down.
    pub fn with_min_duration(mut self, duration: Duration) -> Self {
        self.min_duration = duration;
        self
    }

    /// How far in pixels the pointer can travel before the press is recognized.
    pub fn allowable_movement(&self) -> f64 {
        self.allowable_movement
    }

    /// Sets how far in pixels the pointer can travel before the press is recognized.
    pub fn with_allowable_movement(mut self, distance: f64) -> Self {
        self.allowable_movement = distance;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Pending {
        origin: ScreenPoint,
        position: ScreenPoint,
        pressed_at: Instant,
    },
    Recognized {
        position: ScreenPoint,
    },
    Failed,
}

/// Long press state machine. See the [module docs](self).
#[derive(Debug)]
pub struct LongPressRecognizer {
    config: LongPressConfig,
    state: State,
}

impl Default for LongPressRecognizer {
    fn default() -> Self {
        Self::new(LongPressConfig::default())
    }
}

impl LongPressRecognizer {
    /// Creates a new recognizer.
    pub fn new(config: LongPressConfig) -> Self {
        Self {
            config,
            state: State::Idle,
        }
    }

    /// Configuration of the recognizer.
    pub fn config(&self) -> &LongPressConfig {
        &self.config
    }

    /// Returns true while a press is being tracked and may still turn into a long press.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending { .. })
    }

    /// Returns true while a recognized press is held.
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Recognized { .. })
    }

    /// Time left until a pending press is recognized.
    pub fn time_to_recognition(&self, now: Instant) -> Option<Duration> {
        match self.state {
            State::Pending { pressed_at, .. } => Some(
                self.config
                    .min_duration
                    .saturating_sub(now.saturating_duration_since(pressed_at)),
            ),
            _ => None,
        }
    }

    /// The pointer was pressed.
    ///
    /// Starts tracking a new press. A long press that was in progress is cancelled.
    pub fn press(&mut self, position: ScreenPoint, now: Instant) -> Option<LongPressEvent> {
        let previous = std::mem::replace(
            &mut self.state,
            State::Pending {
                origin: position,
                position,
                pressed_at: now,
            },
        );

        match previous {
            State::Recognized { position } => Some(LongPressEvent {
                phase: GesturePhase::Cancelled,
                position,
            }),
            _ => None,
        }
    }

    /// The pointer moved.
    pub fn moved(&mut self, position: ScreenPoint, now: Instant) -> Option<LongPressEvent> {
        match self.state {
            State::Pending {
                origin, pressed_at, ..
            } => {
                if distance(&origin, &position) > self.config.allowable_movement {
                    log::trace!("Long press failed: pointer moved too far");
                    self.state = State::Failed;
                    return None;
                }

                self.state = State::Pending {
                    origin,
                    position,
                    pressed_at,
                };
                self.tick(now)
            }
            State::Recognized { position: previous } => {
                if previous == position {
                    return None;
                }

                self.state = State::Recognized { position };
                Some(LongPressEvent {
                    phase: GesturePhase::Changed,
                    position,
                })
            }
            State::Idle | State::Failed => None,
        }
    }

    /// Checks whether a pending press has been held long enough.
    pub fn tick(&mut self, now: Instant) -> Option<LongPressEvent> {
        let State::Pending {
            position,
            pressed_at,
            ..
        } = self.state
        else {
            return None;
        };

        if now.saturating_duration_since(pressed_at) < self.config.min_duration {
            return None;
        }

        self.state = State::Recognized { position };
        Some(LongPressEvent {
            phase: GesturePhase::Began,
            position,
        })
    }

    /// The pointer was released.
    ///
    /// A pending press that reached the minimum duration without a [`tick`](Self::tick) is
    /// recognized on release: in that case [`GesturePhase::Began`] is returned and no `Ended`
    /// follows.
    pub fn release(&mut self, now: Instant) -> Option<LongPressEvent> {
        let event = match self.state {
            State::Pending { .. } => self.tick(now),
            State::Recognized { position } => Some(LongPressEvent {
                phase: GesturePhase::Ended,
                position,
            }),
            State::Idle | State::Failed => None,
        };

        self.state = State::Idle;
        event
    }

    /// The press was interrupted by the host.
    pub fn cancel(&mut self) -> Option<LongPressEvent> {
        let previous = std::mem::replace(&mut self.state, State::Idle);
        match previous {
            State::Recognized { position } => Some(LongPressEvent {
                phase: GesturePhase::Cancelled,
                position,
            }),
            _ => None,
        }
    }
}

fn distance(a: &ScreenPoint, b: &ScreenPoint) -> f64 {
    ((a.x() - b.x()).powi(2) + (a.y() - b.y()).powi(2)).sqrt()
}
