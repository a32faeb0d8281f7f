//! Modal menu dialog: a bordered list of options with an optional title bar
//! and informational labels above the first option.
//!
//! Accepting returns the 1-based option index through the window result;
//! cancelling comes back from [`Runtime::run`] as 0. The dialog is not
//! full-screen, so whatever opened it stays visible underneath.

use std::cell::Cell;
use std::rc::Rc;

use mullion_core::{
    DisplayMetrics, Gamepad, HeldKeys, HoldTimers, Key, KeyEvent, PadButton, Point, PointerButton,
    Rect, Runtime, RuntimeConfig, Scene, Window, WindowResult,
};

use crate::theme;

pub struct Dialog {
    result: WindowResult,
    title: String,
    labels: Vec<String>,
    options: Vec<String>,
    cursor: Cell<usize>,
    anchor_x: Cell<Option<i32>>,
    anchor_y: Cell<Option<i32>>,
    placed: Cell<Rect>,
    timers: HoldTimers,
}

impl Dialog {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            result: WindowResult::new(),
            title: String::new(),
            labels: Vec::new(),
            options: Vec::new(),
            cursor: Cell::new(0),
            anchor_x: Cell::new(None),
            anchor_y: Cell::new(None),
            placed: Cell::new(Rect::default()),
            timers: HoldTimers::new(config),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a non-selectable line above the options.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Vertically centers the dialog on the given row instead of the screen
    /// center. Openers use this to keep a menu next to the item it acts on.
    pub fn anchor_y(self, row: i32) -> Self {
        self.anchor_y.set(Some(row));
        self
    }

    /// Pins the left edge instead of horizontally centering.
    pub fn anchor_x(self, column: i32) -> Self {
        self.anchor_x.set(Some(column));
        self
    }

    /// Highlighted option index, 0-based.
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    /// Where the dialog box landed at the last render or resize.
    pub fn placed(&self) -> Rect {
        self.placed.get()
    }

    fn title_rows(&self) -> i32 {
        i32::from(!self.title.is_empty())
    }

    fn layout(&self, screen_w: i32, screen_h: i32) -> Rect {
        let inner = self
            .lines()
            .map(theme::text_width)
            .max()
            .unwrap_or(1)
            .max(1) as i32;
        let w = (inner + 4).min(screen_w);
        let rows = self.title_rows() + self.labels.len() as i32 + self.options.len() as i32;
        let h = (rows + 2).min(screen_h);

        let x = match self.anchor_x.get() {
            Some(col) => col.min(screen_w - w).max(0),
            None => (screen_w - w) / 2,
        };
        let y = match self.anchor_y.get() {
            Some(row) => {
                let mut y = row - h / 2;
                if y < theme::Y_LIST {
                    y = theme::Y_LIST;
                }
                if y + h > screen_h {
                    y = screen_h - h;
                }
                y.max(0)
            }
            None => (screen_h - h) / 2,
        };
        Rect::new(x, y, w, h)
    }

    fn lines(&self) -> impl Iterator<Item = &str> {
        let title = (!self.title.is_empty()).then_some(self.title.as_str());
        title
            .into_iter()
            .chain(self.labels.iter().map(String::as_str))
            .chain(self.options.iter().map(String::as_str))
    }

    fn move_up(&self, wrap: bool) -> bool {
        let cursor = self.cursor.get();
        if cursor > 0 {
            self.cursor.set(cursor - 1);
            true
        } else if wrap && self.options.len() > 1 {
            self.cursor.set(self.options.len() - 1);
            true
        } else {
            false
        }
    }

    fn move_down(&self, wrap: bool) -> bool {
        let cursor = self.cursor.get();
        if cursor + 1 < self.options.len() {
            self.cursor.set(cursor + 1);
            true
        } else if wrap && cursor > 0 {
            self.cursor.set(0);
            true
        } else {
            false
        }
    }

    fn jump_first(&self) -> bool {
        if self.cursor.get() != 0 {
            self.cursor.set(0);
            true
        } else {
            false
        }
    }

    fn jump_last(&self) -> bool {
        if self.cursor.get() + 1 < self.options.len() {
            self.cursor.set(self.options.len() - 1);
            true
        } else {
            false
        }
    }

    fn accept(&self) {
        self.result.set(self.cursor.get() as i32 + 1);
    }

    /// Option row index under `pos` within `rect`, if any.
    fn option_at(&self, rect: Rect, pos: Point) -> Option<usize> {
        let first = rect.y + 1 + self.title_rows() + self.labels.len() as i32;
        let row = pos.y - first;
        (row >= 0 && (row as usize) < self.options.len()).then_some(row as usize)
    }
}

impl Window for Dialog {
    fn render(&self, scene: &mut Scene, has_focus: bool) {
        let rect = self.layout(scene.w, scene.h);
        self.placed.set(rect);

        scene.rect(rect, theme::BORDER);
        let body_y = rect.y + 1 + self.title_rows();
        scene.rect(
            Rect::new(rect.x + 1, body_y, rect.w - 2, rect.y + rect.h - 1 - body_y),
            theme::BG_LIGHT,
        );

        let text_w = (rect.w - 4).max(0) as usize;
        let mut y = rect.y + 1;
        if !self.title.is_empty() {
            scene.text(
                rect.x + 2,
                y,
                theme::clip_tail(&self.title, text_w),
                theme::TEXT_TITLE,
                None,
            );
            y += 1;
        }
        for label in &self.labels {
            scene.text(
                rect.x + 2,
                y,
                theme::clip_tail(label, text_w),
                theme::TEXT_NORMAL,
                None,
            );
            y += 1;
        }
        let bar = if has_focus {
            theme::CURSOR_FOCUS
        } else {
            theme::CURSOR_BLUR
        };
        for (i, option) in self.options.iter().enumerate() {
            let mut bg = None;
            if i == self.cursor.get() {
                scene.rect(Rect::new(rect.x + 1, y, rect.w - 2, 1), bar);
                bg = Some(bar);
            }
            scene.text(
                rect.x + 2,
                y,
                theme::clip_tail(option, text_w),
                theme::TEXT_NORMAL,
                bg,
            );
            y += 1;
        }
    }

    fn result(&self) -> &WindowResult {
        &self.result
    }

    fn on_resize(&self, metrics: &DisplayMetrics) {
        self.placed.set(self.layout(metrics.w, metrics.h));
    }

    fn key_press(&self, _rt: &mut Runtime, ev: &KeyEvent) -> bool {
        if !ev.is_repeat {
            self.timers.key_pressed(ev.key);
        }
        match ev.key {
            Key::Escape => {
                self.result.cancel();
                true
            }
            Key::ArrowUp => self.move_up(true),
            Key::ArrowDown => self.move_down(true),
            Key::PageUp => self.jump_first(),
            Key::PageDown => self.jump_last(),
            Key::Enter => {
                self.accept();
                true
            }
            _ => false,
        }
    }

    fn button_press(&self, _rt: &mut Runtime, button: PadButton) -> bool {
        self.timers.button_pressed(button);
        match button {
            PadButton::B => {
                self.result.cancel();
                true
            }
            PadButton::Up => self.move_up(true),
            PadButton::Down => self.move_down(true),
            PadButton::LeftShoulder => self.jump_first(),
            PadButton::RightShoulder => self.jump_last(),
            PadButton::A => {
                self.accept();
                true
            }
            _ => false,
        }
    }

    fn mouse_down(&self, rt: &mut Runtime, button: PointerButton, pos: Point) -> bool {
        // Clicks can arrive before the first render places the box.
        let rect = self.layout(rt.metrics().w, rt.metrics().h);
        self.placed.set(rect);
        if !rect.contains(pos) {
            self.result.cancel();
            return true;
        }
        let Some(row) = self.option_at(rect, pos) else {
            return false;
        };
        self.cursor.set(row);
        if button == PointerButton::Primary {
            self.accept();
        }
        true
    }

    fn mouse_wheel(&self, _rt: &mut Runtime, _dx: i32, dy: i32) -> bool {
        if dy > 0 {
            self.move_up(false)
        } else if dy < 0 {
            self.move_down(false)
        } else {
            false
        }
    }

    fn key_hold(&self, held: &dyn HeldKeys) -> bool {
        for key in [Key::ArrowUp, Key::ArrowDown] {
            if self.timers.tick_key(key, held) {
                return match key {
                    Key::ArrowUp => self.move_up(false),
                    _ => self.move_down(false),
                };
            }
        }
        false
    }

    fn pad_hold(&self, pad: &dyn Gamepad) -> bool {
        for button in [PadButton::Up, PadButton::Down] {
            if self.timers.tick_button(button, pad) {
                return match button {
                    PadButton::Up => self.move_up(false),
                    _ => self.move_down(false),
                };
            }
        }
        false
    }
}

/// Blocking error popup, `action` and `error` shown as labels over a single
/// OK option. Swallows runtime failures so callers keep their `bool` shape.
pub fn error_dialog(rt: &mut Runtime, action: &str, error: &str) {
    let dialog = Rc::new(
        Dialog::new(rt.config())
            .title("Error:")
            .label(action)
            .label(error)
            .option("OK"),
    );
    if let Err(err) = rt.run(dialog) {
        log::error!("error dialog aborted: {err}");
    }
}
