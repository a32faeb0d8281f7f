//! Scripted platform for driving modal loops without a display.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::clock::TestClock;
use crate::event::{Key, KeyEvent, RawEvent};
use crate::pad::{PadButton, PhysButton};
use crate::platform::{Gamepad, HeldKeys, Platform, PlatformError};
use crate::scene::Scene;

/// Pad double. Buttons set down here are what hold polls observe.
#[derive(Default)]
pub struct SimPad {
    down: HashSet<PadButton>,
}

impl SimPad {
    pub fn set_down(&mut self, button: PadButton, down: bool) {
        if down {
            self.down.insert(button);
        } else {
            self.down.remove(&button);
        }
    }
}

impl Gamepad for SimPad {
    fn is_down(&self, button: PadButton) -> bool {
        self.down.contains(&button)
    }
}

/// Everything the loop did to the backend, kept behind a shared handle so
/// it stays observable after the platform moves into a runtime.
#[derive(Default)]
pub struct Recording {
    /// Every frame handed to [`Platform::present`].
    pub scenes: Vec<Scene>,
    /// Every pacing sleep, in order.
    pub slept: Vec<Duration>,
    /// Every [`Platform::set_text_input`] call, in order.
    pub text_input_calls: Vec<bool>,
    /// Every [`Platform::set_cursor_visible`] call, in order.
    pub cursor_calls: Vec<bool>,
}

enum ScriptStep {
    Event(RawEvent),
    /// Report "no events" this many times, one frame each.
    Wait(u32),
    KeyDown(Key),
    KeyUp(Key),
    PadDown(PadButton),
    PadUp(PadButton),
}

/// Platform double running entirely off a [`TestClock`].
///
/// Events come from a script built up front; [`Platform::delay`] advances
/// the clock instead of sleeping, so paced loops run at full speed with
/// deterministic timestamps. Held-state changes are script steps too and
/// take effect at their position in the script, not when queued. When the
/// script runs dry, a single quit event is delivered (unless
/// `quit_when_drained` is turned off) so a driven loop always terminates.
///
/// One pad is connected by default.
pub struct ScriptedPlatform {
    clock: TestClock,
    script: VecDeque<ScriptStep>,
    keys_down: HashSet<Key>,
    pads: Vec<SimPad>,
    drained: bool,
    pub quit_when_drained: bool,
    text_input: bool,
    recording: Rc<RefCell<Recording>>,
}

impl ScriptedPlatform {
    pub fn new(clock: TestClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
            keys_down: HashSet::new(),
            pads: vec![SimPad::default()],
            drained: false,
            quit_when_drained: true,
            text_input: false,
            recording: Rc::new(RefCell::new(Recording::default())),
        }
    }

    /// Handle onto the recording; clone it out before boxing the platform.
    pub fn recording(&self) -> Rc<RefCell<Recording>> {
        self.recording.clone()
    }

    pub fn push_event(&mut self, event: RawEvent) {
        self.script.push_back(ScriptStep::Event(event));
    }

    /// Let `frames` loop iterations pass with no pending events.
    pub fn wait_frames(&mut self, frames: u32) {
        if frames > 0 {
            self.script.push_back(ScriptStep::Wait(frames));
        }
    }

    /// Queue a key press and mark the key held from this point on.
    pub fn press_key(&mut self, key: Key) {
        self.script.push_back(ScriptStep::KeyDown(key));
        self.push_event(RawEvent::Key(KeyEvent::plain(key)));
    }

    /// Mark the key released from this point in the script on.
    pub fn release_key(&mut self, key: Key) {
        self.script.push_back(ScriptStep::KeyUp(key));
    }

    /// Queue a pad button press and mark it held on pad 0.
    pub fn press_button(&mut self, button: PhysButton) {
        self.script.push_back(ScriptStep::PadDown(button.to_logical()));
        self.push_event(RawEvent::PadButton {
            button,
            pressed: true,
        });
    }

    pub fn release_button(&mut self, button: PhysButton) {
        self.script.push_back(ScriptStep::PadUp(button.to_logical()));
        self.push_event(RawEvent::PadButton {
            button,
            pressed: false,
        });
    }
}

impl HeldKeys for ScriptedPlatform {
    fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

impl Platform for ScriptedPlatform {
    fn poll_event(&mut self) -> Result<Option<RawEvent>, PlatformError> {
        loop {
            match self.script.pop_front() {
                Some(ScriptStep::Event(event)) => return Ok(Some(event)),
                Some(ScriptStep::Wait(frames)) => {
                    if frames > 1 {
                        self.script.push_front(ScriptStep::Wait(frames - 1));
                    }
                    return Ok(None);
                }
                Some(ScriptStep::KeyDown(key)) => {
                    self.keys_down.insert(key);
                }
                Some(ScriptStep::KeyUp(key)) => {
                    self.keys_down.remove(&key);
                }
                Some(ScriptStep::PadDown(button)) => {
                    self.pads[0].set_down(button, true);
                }
                Some(ScriptStep::PadUp(button)) => {
                    self.pads[0].set_down(button, false);
                }
                None => {
                    if self.quit_when_drained && !self.drained {
                        self.drained = true;
                        return Ok(Some(RawEvent::Quit));
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn pad_count(&self) -> usize {
        self.pads.len()
    }

    fn pad(&self, index: usize) -> Option<&dyn Gamepad> {
        self.pads.get(index).map(|p| p as &dyn Gamepad)
    }

    fn present(&mut self, scene: &Scene) -> Result<(), PlatformError> {
        self.recording.borrow_mut().scenes.push(scene.clone());
        Ok(())
    }

    fn delay(&mut self, d: Duration) {
        self.clock.advance(d.as_millis() as u64);
        self.recording.borrow_mut().slept.push(d);
    }

    fn set_text_input(&mut self, active: bool) {
        self.text_input = active;
        self.recording.borrow_mut().text_input_calls.push(active);
    }

    fn text_input_active(&self) -> bool {
        self.text_input
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.recording.borrow_mut().cursor_calls.push(visible);
    }
}
