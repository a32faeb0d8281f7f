//! The file-manager screens: a dual-pane [`Commander`] as the root
//! window, menu [`Dialog`]s, a text [`Viewer`], and an on-screen keyboard
//! [`Prompt`], all talking to the filesystem through [`DirLister`].
//!
//! Everything here is display-agnostic. Screens lay out in logical cells
//! against [`mullion_core::Scene`]; a backend decides what a cell is.

pub mod commander;
pub mod dialog;
pub mod fs;
pub mod prompt;
pub mod theme;
pub mod viewer;

pub use commander::{Commander, Pane};
pub use dialog::{error_dialog, Dialog};
pub use fs::{DirLister, Entry, ListerRef, MemoryLister, OsLister};
pub use prompt::{Prompt, TextBuffer};
pub use viewer::Viewer;
