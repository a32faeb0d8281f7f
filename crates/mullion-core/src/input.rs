//! Collapses raw backend events into the vocabulary windows handle.

use crate::axis::{AxisDir, AxisX, AxisY};
use crate::config::RuntimeConfig;
use crate::event::{Event, PadAxis, RawEvent};
use crate::pad::{PadButton, TriggerLatch};

/// The stateful half of input handling: stick discretization against the
/// deadzones, and trigger latching. Everything else maps one to one.
pub struct Normalizer {
    deadzone_x: i16,
    deadzone_y: i16,
    held: AxisDir,
    trigger_left: TriggerLatch,
    trigger_right: TriggerLatch,
}

impl Normalizer {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            deadzone_x: config.deadzone_x,
            deadzone_y: config.deadzone_y,
            held: AxisDir::default(),
            trigger_left: TriggerLatch::default(),
            trigger_right: TriggerLatch::default(),
        }
    }

    /// Direction currently held on the sticks, after deadzones. Both
    /// sticks feed the same direction; the loop reads this every frame
    /// whether or not new motion arrived.
    pub fn held_direction(&self) -> AxisDir {
        self.held
    }

    /// Turn one raw event into at most one dispatchable event.
    pub fn ingest(&mut self, raw: RawEvent) -> Option<Event> {
        match raw {
            RawEvent::Key(ev) => Some(Event::Key(ev)),
            RawEvent::Text(ev) => Some(Event::Text(ev)),
            RawEvent::PointerDown { button, x, y } => Some(Event::PointerDown { button, x, y }),
            RawEvent::PointerMoved { x, y } => Some(Event::PointerMoved { x, y }),
            RawEvent::Wheel { dx, dy } => Some(Event::Wheel { dx, dy }),
            RawEvent::PadButton { button, pressed } => {
                // Releases only matter to hold polling, which queries the
                // pad directly.
                pressed.then(|| Event::Button(button.to_logical()))
            }
            RawEvent::PadAxis { axis, value } => self.axis_motion(axis, value),
            RawEvent::Resized { w, h } => Some(Event::Resized { w, h }),
            RawEvent::Exposed => Some(Event::Exposed),
            RawEvent::Quit => Some(Event::Quit),
        }
    }

    fn axis_motion(&mut self, axis: PadAxis, value: i16) -> Option<Event> {
        match axis {
            PadAxis::LeftX | PadAxis::RightX => {
                self.held.x = if value < -self.deadzone_x || value > self.deadzone_x {
                    if value > 0 { AxisX::Right } else { AxisX::Left }
                } else {
                    AxisX::Center
                };
                None
            }
            PadAxis::LeftY | PadAxis::RightY => {
                self.held.y = if value < -self.deadzone_y || value > self.deadzone_y {
                    if value > 0 { AxisY::Down } else { AxisY::Up }
                } else {
                    AxisY::Center
                };
                None
            }
            PadAxis::TriggerLeft => self
                .trigger_left
                .update(value)
                .then_some(Event::Button(PadButton::TriggerLeft)),
            PadAxis::TriggerRight => self
                .trigger_right
                .update(value)
                .then_some(Event::Button(PadButton::TriggerRight)),
        }
    }
}
