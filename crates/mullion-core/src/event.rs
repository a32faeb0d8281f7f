//! Input vocabulary, in two tiers: [`RawEvent`] is what a backend yields
//! from its poll, [`Event`] is what reaches window handlers after the
//! [`Normalizer`](crate::input::Normalizer) has had its say.

use crate::pad::{PadButton, PhysButton};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Character(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Insert,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    F(u8), // F1-F12
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Set when the backend's own autorepeat produced this event.
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            is_repeat: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,   // left mouse, touch
    Secondary, // right mouse
    Tertiary,  // middle mouse
}

#[derive(Clone, Debug)]
pub enum TextEvent {
    /// Finalized text, ready to insert.
    Commit(String),
    /// In-progress IME composition.
    Preedit {
        text: String,
        cursor: Option<(usize, usize)>,
    },
}

/// Analog axes a pad can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

/// What backends produce. Pad payloads stay raw (physical button identity,
/// signed axis magnitude) so thresholding policy lives in the core, not in
/// every adapter.
#[derive(Clone, Debug)]
pub enum RawEvent {
    Key(KeyEvent),
    Text(TextEvent),
    PointerDown { button: PointerButton, x: i32, y: i32 },
    PointerMoved { x: i32, y: i32 },
    Wheel { dx: i32, dy: i32 },
    PadButton { button: PhysButton, pressed: bool },
    PadAxis { axis: PadAxis, value: i16 },
    Resized { w: i32, h: i32 },
    Exposed,
    Quit,
}

/// What the modal loop dispatches. Pointer coordinates are still physical
/// here; the loop maps them to logical units at the handler call.
#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    Button(PadButton),
    Text(TextEvent),
    PointerDown { button: PointerButton, x: i32, y: i32 },
    PointerMoved { x: i32, y: i32 },
    Wheel { dx: i32, dy: i32 },
    Resized { w: i32, h: i32 },
    Exposed,
    Quit,
}
