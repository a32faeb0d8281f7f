//! The contract every modal screen implements.

use std::cell::Cell;

use crate::display::DisplayMetrics;
use crate::event::{KeyEvent, PointerButton, TextEvent};
use crate::geometry::Point;
use crate::pad::PadButton;
use crate::platform::{Gamepad, HeldKeys};
use crate::runtime::Runtime;
use crate::scene::Scene;

/// Terminal result slot of a window.
///
/// Zero means the loop keeps running. Positive values are accept results
/// chosen by the window (a row index, a keycap, ...). Negative means
/// cancel; [`Runtime::run`] reports plain cancellation back as zero, so
/// callers only ever distinguish "choice N" from "nothing".
#[derive(Debug, Default)]
pub struct WindowResult(Cell<i32>);

impl WindowResult {
    pub const RUNNING: i32 = 0;
    pub const CANCELED: i32 = -1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i32 {
        self.0.get()
    }

    pub fn set(&self, value: i32) {
        self.0.set(value);
    }

    pub fn cancel(&self) {
        self.0.set(Self::CANCELED);
    }

    pub fn clear(&self) {
        self.0.set(Self::RUNNING);
    }

    pub fn is_set(&self) -> bool {
        self.0.get() != Self::RUNNING
    }
}

/// A modal screen.
///
/// All hooks take `&self`; a window keeps its mutable state in `Cell` and
/// `RefCell` fields. That is what lets a parent, suspended under a nested
/// dialog while one of its own handler frames is still live, be rendered
/// as part of the stack repaint.
///
/// Event handlers return true when the screen needs repainting. Handlers
/// that open nested dialogs do so by calling [`Runtime::run`] right there;
/// control returns once the dialog is done.
pub trait Window {
    /// Append this window's draw commands. `has_focus` is true only for
    /// the topmost window of the stack.
    fn render(&self, scene: &mut Scene, has_focus: bool);

    /// Result slot the modal loop watches.
    fn result(&self) -> &WindowResult;

    /// Full-screen windows repaint the whole output, occluding everything
    /// beneath them in the stack.
    fn is_full_screen(&self) -> bool {
        false
    }

    /// Whether the backend should run its text input (IME) machinery
    /// while this window is running.
    fn handles_text_input(&self) -> bool {
        false
    }

    /// Regenerate cached, size-dependent state. Called on every stacked
    /// window whenever the logical size changes, not only the running
    /// one, so it must be idempotent.
    fn on_resize(&self, _metrics: &DisplayMetrics) {}

    fn key_press(&self, _rt: &mut Runtime, _ev: &KeyEvent) -> bool {
        false
    }

    /// A logical pad button went down. Debounced stick directions arrive
    /// here too, as Up/Down/Left/Right.
    fn button_press(&self, _rt: &mut Runtime, _button: PadButton) -> bool {
        false
    }

    /// Pointer press, already mapped to logical units.
    fn mouse_down(&self, _rt: &mut Runtime, _button: PointerButton, _pos: Point) -> bool {
        false
    }

    fn mouse_wheel(&self, _rt: &mut Runtime, _dx: i32, _dy: i32) -> bool {
        false
    }

    fn text_input(&self, _rt: &mut Runtime, _ev: &TextEvent) -> bool {
        false
    }

    /// Hold poll, once per frame: feed the key repeat timer from current
    /// keyboard state.
    fn key_hold(&self, _held: &dyn HeldKeys) -> bool {
        false
    }

    /// Hold poll, once per frame per connected pad.
    fn pad_hold(&self, _pad: &dyn Gamepad) -> bool {
        false
    }
}
