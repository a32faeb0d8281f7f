//! Hold-to-repeat, counted in hold polls rather than wall time. Repeat
//! cadence therefore tracks the configured frame rate.

use std::cell::RefCell;

use crate::config::RuntimeConfig;
use crate::event::Key;
use crate::pad::PadButton;
use crate::platform::{Gamepad, HeldKeys};

/// Single-slot repeat state machine.
///
/// Feed every fresh discrete press into [`press`](Self::press), then call
/// [`tick`](Self::tick) once per frame while the input may still be held.
/// The first repeat fires `first_delay` polls after the press poll, later
/// ones every `next_delay` polls, and releasing stops the timer cold.
pub struct RepeatTimer<K: Copy + PartialEq> {
    first_delay: u32,
    next_delay: u32,
    tracked: Option<K>,
    countdown: u32,
}

impl<K: Copy + PartialEq> RepeatTimer<K> {
    pub fn new(first_delay: u32, next_delay: u32) -> Self {
        Self {
            first_delay,
            next_delay,
            tracked: None,
            countdown: 0,
        }
    }

    /// Record a fresh discrete press. Zeroes the countdown, so a repeat
    /// never fires on the same frame as the press itself.
    pub fn press(&mut self, key: K) {
        self.tracked = Some(key);
        self.countdown = 0;
    }

    /// One hold poll for `key`. Returns true exactly on repeat ticks.
    pub fn tick(&mut self, key: K, held: bool) -> bool {
        if self.tracked != Some(key) {
            return false;
        }
        if held {
            if self.countdown != 0 {
                self.countdown -= 1;
                if self.countdown == 0 {
                    self.countdown = self.next_delay;
                    return true;
                }
            } else {
                self.countdown = self.first_delay;
            }
        } else if self.countdown != 0 {
            self.countdown = 0;
        }
        false
    }
}

/// The repeat-timer pair a window carries: one slot for the keyboard, one
/// for pad buttons. At most one key and one button repeat at a time.
/// Interior mutability keeps the window hooks `&self`.
pub struct HoldTimers {
    keys: RefCell<RepeatTimer<Key>>,
    buttons: RefCell<RepeatTimer<PadButton>>,
}

impl HoldTimers {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            keys: RefCell::new(RepeatTimer::new(
                config.repeat_first_delay,
                config.repeat_next_delay,
            )),
            buttons: RefCell::new(RepeatTimer::new(
                config.repeat_first_delay,
                config.repeat_next_delay,
            )),
        }
    }

    /// Call from `key_press` with every fresh key.
    pub fn key_pressed(&self, key: Key) {
        self.keys.borrow_mut().press(key);
    }

    /// Call from `button_press` with every fresh button.
    pub fn button_pressed(&self, button: PadButton) {
        self.buttons.borrow_mut().press(button);
    }

    /// Poll from `key_hold`: true when `key` should repeat this frame.
    pub fn tick_key(&self, key: Key, held: &dyn HeldKeys) -> bool {
        self.keys.borrow_mut().tick(key, held.is_down(key))
    }

    /// Poll from `pad_hold`: true when `button` should repeat this frame.
    pub fn tick_button(&self, button: PadButton, pad: &dyn Gamepad) -> bool {
        self.buttons.borrow_mut().tick(button, pad.is_down(button))
    }
}
