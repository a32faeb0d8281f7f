//! What the runtime asks of a backend.

use std::time::Duration;

use crate::event::{Key, RawEvent};
use crate::pad::PadButton;
use crate::scene::Scene;

/// Keyboard state queries for hold polling.
pub trait HeldKeys {
    fn is_down(&self, key: Key) -> bool;
}

/// One connected controller, queried by logical button.
pub trait Gamepad {
    fn is_down(&self, button: PadButton) -> bool;
}

/// Backend surface the modal loop drives.
///
/// Failures here are fatal to the loop. There is no degraded mode for a UI
/// whose display or input source has gone away.
pub trait Platform: HeldKeys {
    /// Next pending event, without blocking.
    fn poll_event(&mut self) -> Result<Option<RawEvent>, PlatformError>;

    fn pad_count(&self) -> usize;
    fn pad(&self, index: usize) -> Option<&dyn Gamepad>;

    /// Rasterize and show one frame.
    fn present(&mut self, scene: &Scene) -> Result<(), PlatformError>;

    /// Sleep out a pacing gap. Test doubles advance their clock instead.
    fn delay(&mut self, d: Duration);

    /// Toggle the backend's text input (IME) machinery.
    fn set_text_input(&mut self, active: bool);
    fn text_input_active(&self) -> bool;

    fn set_cursor_visible(&mut self, visible: bool);
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("backend i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Backend(String),
}
