//! Line-input prompt driven by an on-screen keyboard.
//!
//! Focus walks a cycle of zones: the text field, four rows of keycaps, and
//! a Cancel/OK button row. A accepts the focused keycap, Start accepts the
//! whole input, and a real keyboard (or IME, via `text_input`) types
//! directly into the field.

use std::cell::{Cell, RefCell};

use unicode_segmentation::UnicodeSegmentation;

use mullion_core::{
    DisplayMetrics, Gamepad, HeldKeys, HoldTimers, Key, KeyEvent, PadButton, Point, PointerButton,
    Rect, Runtime, RuntimeConfig, Scene, TextEvent, Window, WindowResult,
};

use crate::theme;

const KEY_COLS: i32 = 12;
const KEY_ROWS: i32 = 4;
/// Focus row index of the Cancel/OK row; the text field is row -1.
const BUTTONS_ROW: i32 = KEY_ROWS;

const BACKSPACE_CAP: &str = "←";

const KEYSETS: [[[&str; 12]; 4]; 2] = [
    [
        ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "="],
        ["q", "w", "e", "r", "t", "y", "u", "i", "o", "p", "[", "]"],
        ["a", "s", "d", "f", "g", "h", "j", "k", "l", ";", "'", "\\"],
        ["z", "x", "c", "v", "b", "n", "m", ",", ".", "/", " ", BACKSPACE_CAP],
    ],
    [
        ["!", "@", "#", "$", "%", "^", "&", "*", "(", ")", "_", "+"],
        ["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "{", "}"],
        ["A", "S", "D", "F", "G", "H", "J", "K", "L", ":", "\"", "|"],
        ["Z", "X", "C", "V", "B", "N", "M", "<", ">", "?", " ", BACKSPACE_CAP],
    ],
];

fn prev_grapheme_boundary(text: &str, byte: usize) -> usize {
    let mut last = 0;
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            break;
        }
        last = i;
    }
    last
}

fn next_grapheme_boundary(text: &str, byte: usize) -> usize {
    for (i, _) in text.grapheme_indices(true) {
        if i > byte {
            return i;
        }
    }
    text.len()
}

/// Editable line with a grapheme-aligned cursor.
#[derive(Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn new(initial: &str) -> Self {
        Self {
            text: initial.to_owned(),
            cursor: initial.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position as a grapheme index.
    pub fn cursor_units(&self) -> usize {
        self.text[..self.cursor].graphemes(true).count()
    }

    pub fn insert(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.text, self.cursor);
        self.text.replace_range(prev..self.cursor, "");
        self.cursor = prev;
        true
    }

    pub fn move_prev(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = prev_grapheme_boundary(&self.text, self.cursor);
        true
    }

    pub fn move_next(&mut self) -> bool {
        if self.cursor == self.text.len() {
            return false;
        }
        self.cursor = next_grapheme_boundary(&self.text, self.cursor);
        true
    }

    pub fn to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = 0;
        true
    }

    pub fn to_end(&mut self) -> bool {
        if self.cursor == self.text.len() {
            return false;
        }
        self.cursor = self.text.len();
        true
    }
}

pub struct Prompt {
    result: WindowResult,
    buffer: RefCell<TextBuffer>,
    preedit: RefCell<Option<String>>,
    keyset: Cell<usize>,
    /// (column, row); row -1 is the text field, `BUTTONS_ROW` the last row.
    focus: Cell<(i32, i32)>,
    timers: HoldTimers,
}

impl Prompt {
    pub fn new(config: &RuntimeConfig, initial: &str) -> Self {
        Self {
            result: WindowResult::new(),
            buffer: RefCell::new(TextBuffer::new(initial)),
            preedit: RefCell::new(None),
            keyset: Cell::new(0),
            focus: Cell::new((0, -1)),
            timers: HoldTimers::new(config),
        }
    }

    /// The edited line; read after an accepting result.
    pub fn text(&self) -> String {
        self.buffer.borrow().text().to_owned()
    }

    fn keycap(&self, col: i32, row: i32) -> &'static str {
        KEYSETS[self.keyset.get()][row as usize][col as usize]
    }

    fn in_text_field(&self) -> bool {
        self.focus.get().1 == -1
    }

    fn focus_text_field(&self) {
        self.focus.set((0, -1));
    }

    fn move_up(&self, wrap: bool) -> bool {
        let (mut x, y) = self.focus.get();
        if !wrap && y == -1 {
            return false;
        }
        match y {
            0 => self.focus_text_field(),
            -1 => self.focus.set((0, BUTTONS_ROW)),
            _ => {
                if y == BUTTONS_ROW {
                    x += (KEY_COLS - 1) / 2;
                }
                self.focus.set((x, y - 1));
            }
        }
        true
    }

    fn move_down(&self, wrap: bool) -> bool {
        let (mut x, y) = self.focus.get();
        if !wrap && y == BUTTONS_ROW {
            return false;
        }
        match y {
            BUTTONS_ROW => self.focus_text_field(),
            -1 => self.focus.set((0, 0)),
            _ => {
                if y == KEY_ROWS - 1 {
                    x = i32::from(x >= KEY_COLS / 2);
                }
                self.focus.set((x, y + 1));
            }
        }
        true
    }

    fn move_left(&self, wrap: bool) -> bool {
        if self.in_text_field() {
            return self.buffer.borrow_mut().move_prev();
        }
        let (x, y) = self.focus.get();
        let width = if y == BUTTONS_ROW { 2 } else { KEY_COLS };
        if !wrap && x == 0 {
            return false;
        }
        self.focus.set(((width + x - 1) % width, y));
        true
    }

    fn move_right(&self, wrap: bool) -> bool {
        if self.in_text_field() {
            return self.buffer.borrow_mut().move_next();
        }
        let (x, y) = self.focus.get();
        let width = if y == BUTTONS_ROW { 2 } else { KEY_COLS };
        if !wrap && x + 1 == width {
            return false;
        }
        self.focus.set(((x + 1) % width, y));
        true
    }

    fn cycle_keyset(&self, forward: bool) {
        let n = KEYSETS.len();
        let next = if forward {
            (self.keyset.get() + 1) % n
        } else {
            (self.keyset.get() + n - 1) % n
        };
        self.keyset.set(next);
    }

    fn type_text(&self, s: &str) {
        self.buffer.borrow_mut().insert(s);
    }

    fn press_focused(&self) -> bool {
        let (x, y) = self.focus.get();
        if y == -1 || y == BUTTONS_ROW {
            // Enter in the field accepts; on the buttons row it picks one.
            if y == BUTTONS_ROW && x == 0 {
                self.result.cancel();
            } else {
                self.result.set(1);
            }
        } else if self.keycap(x, y) == BACKSPACE_CAP {
            return self.buffer.borrow_mut().backspace();
        } else {
            self.type_text(self.keycap(x, y));
        }
        true
    }

    fn layout(&self, screen_w: i32, screen_h: i32) -> Rect {
        let w = (KEY_COLS * 2 - 1 + 4).min(screen_w);
        let h = (KEY_ROWS + 5).min(screen_h);
        let x = (screen_w - w) / 2;
        // Sits just above the footer bar.
        let y = (screen_h - h - theme::FOOTER_ROWS - 1).max(0);
        Rect::new(x, y, w, h)
    }

    /// Maps a screen position to a focus slot, mirroring the render layout.
    fn slot_at(&self, rect: Rect, pos: Point) -> Option<(i32, i32)> {
        let row = pos.y - rect.y;
        if row == 1 {
            return Some((0, -1));
        }
        if row == rect.h - 2 {
            let col = i32::from(pos.x >= rect.x + rect.w / 2);
            return Some((col, BUTTONS_ROW));
        }
        let key_row = row - 3;
        if (0..KEY_ROWS).contains(&key_row) {
            let col = (pos.x - rect.x - 2) / 2;
            if pos.x >= rect.x + 2 && col < KEY_COLS {
                return Some((col, key_row));
            }
        }
        None
    }
}

impl Window for Prompt {
    fn render(&self, scene: &mut Scene, has_focus: bool) {
        let rect = self.layout(scene.w, scene.h);
        scene.rect(rect, theme::BORDER);
        scene.rect(
            Rect::new(rect.x + 1, rect.y + 1, rect.w - 2, rect.h - 2),
            theme::BG_LIGHT,
        );

        let accent = if has_focus {
            theme::CURSOR_FOCUS
        } else {
            theme::CURSOR_BLUR
        };
        let (fx, fy) = self.focus.get();

        // Text field with the cursor kept in view.
        let field_w = (rect.w - 4).max(1) as usize;
        let buffer = self.buffer.borrow();
        let preedit = self.preedit.borrow();
        let shown: String;
        let cursor_units;
        if let Some(pre) = preedit.as_deref() {
            let at = buffer.cursor;
            shown = format!("{}{}{}", &buffer.text[..at], pre, &buffer.text[at..]);
            cursor_units = buffer.cursor_units() + theme::text_width(pre);
        } else {
            shown = buffer.text().to_owned();
            cursor_units = buffer.cursor_units();
        }
        let start = cursor_units.saturating_sub(field_w - 1);
        let field_y = rect.y + 1;
        scene.rect(Rect::new(rect.x + 2, field_y, rect.w - 4, 1), theme::BG_SHADE);
        scene.text(
            rect.x + 2,
            field_y,
            theme::window(&shown, start, field_w),
            theme::TEXT_NORMAL,
            None,
        );
        let cursor_x = rect.x + 2 + (cursor_units - start) as i32;
        let cursor_bg = if fy == -1 { accent } else { theme::CURSOR_BLUR };
        scene.rect(Rect::new(cursor_x, field_y, 1, 1), cursor_bg);

        // Keycap grid.
        for row in 0..KEY_ROWS {
            for col in 0..KEY_COLS {
                let focused = (col, row) == (fx, fy);
                let bg = if focused { accent } else { theme::BG_SHADE };
                let x = rect.x + 2 + col * 2;
                let y = rect.y + 3 + row;
                scene.text(x, y, self.keycap(col, row), theme::TEXT_NORMAL, Some(bg));
            }
        }

        // Cancel / OK.
        let buttons_y = rect.y + rect.h - 2;
        let cancel_bg = ((fx, fy) == (0, BUTTONS_ROW)).then_some(accent);
        let ok_bg = ((fx, fy) == (1, BUTTONS_ROW)).then_some(accent);
        scene.text(rect.x + 2, buttons_y, "Cancel", theme::TEXT_NORMAL, cancel_bg);
        scene.text(
            rect.x + rect.w - 4,
            buttons_y,
            "OK",
            theme::TEXT_NORMAL,
            ok_bg,
        );
    }

    fn result(&self) -> &WindowResult {
        &self.result
    }

    fn handles_text_input(&self) -> bool {
        true
    }

    fn on_resize(&self, _metrics: &DisplayMetrics) {
        self.focus_text_field();
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
            Key::Enter => self.press_focused(),
            Key::ArrowUp => self.move_up(true),
            Key::ArrowDown => self.move_down(true),
            Key::ArrowLeft => self.move_left(true),
            Key::ArrowRight => self.move_right(true),
            Key::PageUp => {
                self.cycle_keyset(false);
                true
            }
            Key::PageDown => {
                self.cycle_keyset(true);
                true
            }
            Key::Backspace | Key::Delete => self.buffer.borrow_mut().backspace(),
            Key::Home => self.buffer.borrow_mut().to_start(),
            Key::End => self.buffer.borrow_mut().to_end(),
            Key::Space => {
                self.type_text(" ");
                true
            }
            Key::Character(c) if !c.is_control() => {
                self.type_text(&c.to_string());
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
            PadButton::Y => self.buffer.borrow_mut().backspace(),
            PadButton::X => {
                self.type_text(" ");
                true
            }
            PadButton::A => self.press_focused(),
            PadButton::LeftShoulder => {
                self.cycle_keyset(false);
                true
            }
            PadButton::RightShoulder => {
                self.cycle_keyset(true);
                true
            }
            PadButton::Start => {
                self.result.set(1);
                true
            }
            PadButton::Up => self.move_up(true),
            PadButton::Down => self.move_down(true),
            PadButton::Left => self.move_left(true),
            PadButton::Right => self.move_right(true),
            _ => false,
        }
    }

    fn mouse_down(&self, rt: &mut Runtime, button: PointerButton, pos: Point) -> bool {
        let rect = self.layout(rt.metrics().w, rt.metrics().h);
        if !rect.contains(pos) {
            self.result.cancel();
            return true;
        }
        let Some(slot) = self.slot_at(rect, pos) else {
            return false;
        };
        self.focus.set(slot);
        if button == PointerButton::Primary && slot.1 != -1 {
            self.press_focused();
        }
        true
    }

    fn text_input(&self, _rt: &mut Runtime, ev: &TextEvent) -> bool {
        match ev {
            TextEvent::Commit(s) => {
                self.preedit.replace(None);
                self.type_text(s);
                true
            }
            TextEvent::Preedit { text, .. } => {
                self.preedit
                    .replace((!text.is_empty()).then(|| text.clone()));
                true
            }
        }
    }

    fn key_hold(&self, held: &dyn HeldKeys) -> bool {
        for key in [
            Key::ArrowUp,
            Key::ArrowDown,
            Key::ArrowLeft,
            Key::ArrowRight,
            Key::Enter,
            Key::Backspace,
        ] {
            if self.timers.tick_key(key, held) {
                return match key {
                    Key::ArrowUp => self.move_up(false),
                    Key::ArrowDown => self.move_down(false),
                    Key::ArrowLeft => self.move_left(false),
                    Key::ArrowRight => self.move_right(false),
                    Key::Enter => self.press_focused(),
                    _ => self.buffer.borrow_mut().backspace(),
                };
            }
        }
        false
    }

    fn pad_hold(&self, pad: &dyn Gamepad) -> bool {
        for button in [
            PadButton::Up,
            PadButton::Down,
            PadButton::Left,
            PadButton::Right,
            PadButton::A,
            PadButton::Y,
            PadButton::X,
        ] {
            if self.timers.tick_button(button, pad) {
                return match button {
                    PadButton::Up => self.move_up(false),
                    PadButton::Down => self.move_down(false),
                    PadButton::Left => self.move_left(false),
                    PadButton::Right => self.move_right(false),
                    PadButton::A => self.press_focused(),
                    PadButton::Y => self.buffer.borrow_mut().backspace(),
                    _ => {
                        self.type_text(" ");
                        true
                    }
                };
            }
        }
        false
    }
}
