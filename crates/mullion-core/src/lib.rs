//! # Modal windows for d-pad devices
//!
//! Mullion is the window runtime of a file commander for handheld Linux
//! devices: small screens, a d-pad, a few buttons, maybe a controller,
//! maybe a pointer. Every screen is a modal [`Window`] on one shared
//! stack, and "open a dialog" is an ordinary blocking call.
//!
//! Three things do most of the work here:
//!
//! - [`Runtime::run`], the modal loop. Drains backend events, dispatches
//!   them to the running window's handlers, polls held keys and pad
//!   buttons for synthetic repeats, repaints the stack when something
//!   changed, and paces itself to the configured frame rate.
//! - [`WindowStack`], paint order and focus. Repaints start at the
//!   nearest-to-top full-screen window; only the topmost window has
//!   focus. Push/pop discipline is enforced by a scoped guard.
//! - The input layer ([`Normalizer`], [`AxisRepeater`], [`RepeatTimer`]):
//!   one event vocabulary for keyboard, pointer, and controller, with
//!   OS-feeling key repeat on a platform that has none.
//!
//! A window sets its [`WindowResult`] from a handler to end its loop:
//! positive values are selections, cancellation comes back to the caller
//! as zero.
//!
//! ```
//! use std::rc::Rc;
//!
//! use mullion_core::sim::ScriptedPlatform;
//! use mullion_core::{
//!     Color, Key, KeyEvent, Runtime, RuntimeConfig, Scene, TestClock, Window, WindowResult,
//! };
//!
//! struct Confirm {
//!     result: WindowResult,
//! }
//!
//! impl Window for Confirm {
//!     fn render(&self, scene: &mut Scene, _has_focus: bool) {
//!         scene.text(2, 1, "overwrite?", Color::rgb(255, 255, 255), None);
//!     }
//!     fn result(&self) -> &WindowResult {
//!         &self.result
//!     }
//!     fn key_press(&self, _rt: &mut Runtime, ev: &KeyEvent) -> bool {
//!         match ev.key {
//!             Key::Enter => self.result.set(1),
//!             Key::Escape => self.result.cancel(),
//!             _ => {}
//!         }
//!         true
//!     }
//! }
//!
//! let clock = TestClock::new();
//! let mut platform = ScriptedPlatform::new(clock.clone());
//! platform.press_key(Key::Enter);
//!
//! let mut rt = Runtime::new(Box::new(platform), Box::new(clock), RuntimeConfig::default());
//! let choice = rt.run(Rc::new(Confirm { result: WindowResult::new() })).unwrap();
//! assert_eq!(choice, 1);
//! ```
//!
//! Handlers take `&mut Runtime`, so opening a nested dialog is just
//! calling [`Runtime::run`] from inside one; the parent stays on the
//! stack, still painted, until the dialog resolves. Windows keep their
//! mutable state in `Cell`/`RefCell` fields, which is what makes that
//! suspended-but-paintable arrangement work without aliasing trouble.
//!
//! Nothing here talks to real hardware. Backends implement [`Platform`];
//! [`sim::ScriptedPlatform`] is the deterministic one used by the tests.

pub mod axis;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod pacer;
pub mod pad;
pub mod platform;
pub mod repeat;
pub mod runtime;
pub mod scene;
pub mod sim;
pub mod stack;
pub mod window;

pub use axis::*;
pub use clock::*;
pub use config::*;
pub use display::*;
pub use error::*;
pub use event::*;
pub use geometry::*;
pub use input::*;
pub use pacer::*;
pub use pad::*;
pub use platform::*;
pub use repeat::*;
pub use runtime::*;
pub use scene::*;
pub use stack::*;
pub use window::*;
