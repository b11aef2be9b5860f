//! Pointer input of the map widget that galileo's own controller does not handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use galileo::control::{EventPropagation, UserEvent, UserEventHandler};
use galileo::Map;
use mapscreen::{LongPressConfig, LongPressEvent, LongPressRecognizer, ScreenPoint};
use web_time::Instant;

/// Remembers whether the user panned or zoomed the map since the last check.
#[derive(Debug, Default, Clone)]
pub struct InteractionTracker {
    interacted: Arc<AtomicBool>,
}

impl InteractionTracker {
    /// Event handler to register with the map before galileo's map controller.
    pub fn handler(&self) -> Box<dyn UserEventHandler> {
        let interacted = self.interacted.clone();
        Box::new(move |event: &UserEvent, _map: &mut Map| {
            if matches!(
                event,
                UserEvent::DragStarted(..) | UserEvent::Scroll(..) | UserEvent::Zoom(..)
            ) {
                interacted.store(true, Ordering::Relaxed);
            }

            EventPropagation::Propagate
        })
    }

    /// Returns true once for every interaction batch.
    pub fn take(&self) -> bool {
        self.interacted.swap(false, Ordering::Relaxed)
    }
}

/// Pointer state of a single frame, in map widget coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct PointerSample {
    /// Pointer position, if it is over the map.
    pub position: Option<ScreenPoint>,
    /// Primary button went down this frame.
    pub pressed: bool,
    /// Primary button is held.
    pub down: bool,
    /// Primary button went up this frame.
    pub released: bool,
    /// Two or more fingers touch the screen.
    pub multi_touch: bool,
}

impl PointerSample {
    /// Reads the pointer state of the current frame relative to the map rectangle.
    pub fn read(ui: &egui::Ui, map_rect: egui::Rect) -> Self {
        ui.input(|input| {
            let position = input
                .pointer
                .interact_pos()
                .filter(|pos| map_rect.contains(*pos))
                .map(|pos| {
                    ScreenPoint::new(
                        (pos.x - map_rect.left()) as f64,
                        (pos.y - map_rect.top()) as f64,
                    )
                });

            Self {
                position,
                pressed: input.pointer.primary_pressed(),
                down: input.pointer.primary_down(),
                released: input.pointer.primary_released(),
                multi_touch: input.multi_touch().is_some(),
            }
        })
    }
}

/// Feeds the pointer state of every frame into a [`LongPressRecognizer`].
#[derive(Debug, Default)]
pub struct LongPressInput {
    recognizer: LongPressRecognizer,
}

impl LongPressInput {
    /// Creates a new long press input.
    pub fn new(config: LongPressConfig) -> Self {
        Self {
            recognizer: LongPressRecognizer::new(config),
        }
    }

    /// Advances the recognizer by one frame and returns the events it produced.
    pub fn handle(&mut self, sample: PointerSample, now: Instant) -> Vec<LongPressEvent> {
        let mut events = vec![];

        if sample.multi_touch {
            events.extend(self.recognizer.cancel());
            return events;
        }

        match sample.position {
            Some(position) if sample.pressed => events.extend(self.recognizer.press(position, now)),
            Some(position) if sample.down => events.extend(self.recognizer.moved(position, now)),
            None if sample.pressed => {}
            None if sample.down && !sample.released => {
                // Dragged off the map.
                events.extend(self.recognizer.cancel());
            }
            _ => {}
        }

        events.extend(self.recognizer.tick(now));

        if sample.released {
            events.extend(self.recognizer.release(now));
        }

        events
    }

    /// Time after which the UI should run a frame even without input, to recognize a press that is
    /// held still.
    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        self.recognizer.time_to_recognition(now)
    }
}
