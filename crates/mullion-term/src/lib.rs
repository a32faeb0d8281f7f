//! Terminal backend. One logical unit is one character cell, so layouts
//! made for small handheld displays come out at a sane size in any
//! terminal.
//!
//! [`TermPlatform::new`] switches the terminal to raw mode, the alternate
//! screen, and mouse capture; dropping the platform restores everything.
//! Frames are fully repainted into one write, wrapped in a synchronized
//! update so slow terminals do not tear.
//!
//! Key-repeat has two regimes. Terminals that support the keyboard
//! enhancement protocol report press, repeat, and release separately:
//! there we track held keys for the runtime's own repeat timers and drop
//! the terminal's repeat events. Everywhere else nothing reads as held
//! and the terminal's native autorepeat arrives as fresh presses.

use std::collections::HashSet;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, MouseEventKind,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{Print, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use unicode_segmentation::UnicodeSegmentation;

use mullion_core::{
    Color, DrawCmd, Gamepad, HeldKeys, Key, KeyEvent, Modifiers, Platform, PlatformError,
    PointerButton, RawEvent, Rect, Scene, TextEvent,
};

/// One rendered character cell.
#[derive(Clone, PartialEq)]
struct TermCell {
    glyph: String,
    fg: Color,
    bg: Color,
}

impl Default for TermCell {
    fn default() -> Self {
        Self {
            glyph: " ".to_owned(),
            fg: Color::rgb(255, 255, 255),
            bg: Color::rgb(0, 0, 0),
        }
    }
}

fn fill(cells: &mut [TermCell], w: usize, h: usize, rect: &Rect, color: Color) {
    let x0 = rect.x.max(0);
    let y0 = rect.y.max(0);
    let x1 = (rect.x + rect.w).min(w as i32);
    let y1 = (rect.y + rect.h).min(h as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            let cell = &mut cells[y as usize * w + x as usize];
            cell.glyph.clear();
            cell.glyph.push(' ');
            cell.bg = color;
        }
    }
}

/// Writes one box-drawing glyph, keeping the background underneath.
fn put_glyph(cells: &mut [TermCell], w: usize, h: usize, x: i32, y: i32, glyph: char, fg: Color) {
    if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
        return;
    }
    let cell = &mut cells[y as usize * w + x as usize];
    cell.glyph.clear();
    cell.glyph.push(glyph);
    cell.fg = fg;
}

fn draw_frame(cells: &mut [TermCell], w: usize, h: usize, rect: &Rect, color: Color) {
    let x1 = rect.x + rect.w - 1;
    let y1 = rect.y + rect.h - 1;
    for x in rect.x + 1..x1 {
        put_glyph(cells, w, h, x, rect.y, '─', color);
        put_glyph(cells, w, h, x, y1, '─', color);
    }
    for y in rect.y + 1..y1 {
        put_glyph(cells, w, h, rect.x, y, '│', color);
        put_glyph(cells, w, h, x1, y, '│', color);
    }
    put_glyph(cells, w, h, rect.x, rect.y, '┌', color);
    put_glyph(cells, w, h, x1, rect.y, '┐', color);
    put_glyph(cells, w, h, rect.x, y1, '└', color);
    put_glyph(cells, w, h, x1, y1, '┘', color);
}

/// Flattens a scene into a `w * h` cell grid, commands bottom to top.
fn rasterize(scene: &Scene) -> (usize, usize, Vec<TermCell>) {
    let w = scene.w.max(0) as usize;
    let h = scene.h.max(0) as usize;
    let mut cells = vec![TermCell::default(); w * h];
    for cmd in &scene.cmds {
        match cmd {
            DrawCmd::Rect { rect, color } => fill(&mut cells, w, h, rect, *color),
            DrawCmd::Frame { rect, color } => draw_frame(&mut cells, w, h, rect, *color),
            DrawCmd::Text { x, y, text, fg, bg } => {
                if *y < 0 || *y >= h as i32 {
                    continue;
                }
                let row = *y as usize * w;
                let mut col = *x;
                for grapheme in text.graphemes(true) {
                    if col >= w as i32 {
                        break;
                    }
                    if col >= 0 {
                        let cell = &mut cells[row + col as usize];
                        cell.glyph.clear();
                        cell.glyph.push_str(grapheme);
                        cell.fg = *fg;
                        if let Some(bg) = bg {
                            cell.bg = *bg;
                        }
                    }
                    col += 1;
                }
            }
        }
    }
    (w, h, cells)
}

fn term_color(color: Color) -> crossterm::style::Color {
    crossterm::style::Color::Rgb {
        r: color.0,
        g: color.1,
        b: color.2,
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Character(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    })
}

fn convert_mouse(ev: event::MouseEvent) -> Option<RawEvent> {
    let x = ev.column as i32;
    let y = ev.row as i32;
    match ev.kind {
        MouseEventKind::Down(button) => Some(RawEvent::PointerDown {
            button: match button {
                event::MouseButton::Left => PointerButton::Primary,
                event::MouseButton::Right => PointerButton::Secondary,
                event::MouseButton::Middle => PointerButton::Tertiary,
            },
            x,
            y,
        }),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(RawEvent::PointerMoved { x, y }),
        MouseEventKind::ScrollUp => Some(RawEvent::Wheel { dx: 0, dy: 1 }),
        MouseEventKind::ScrollDown => Some(RawEvent::Wheel { dx: 0, dy: -1 }),
        MouseEventKind::ScrollLeft => Some(RawEvent::Wheel { dx: -1, dy: 0 }),
        MouseEventKind::ScrollRight => Some(RawEvent::Wheel { dx: 1, dy: 0 }),
        MouseEventKind::Up(_) => None,
    }
}

/// Crossterm-backed [`Platform`]. Construction claims the terminal,
/// dropping it restores the terminal, whatever else happens.
pub struct TermPlatform {
    /// Terminal reports key release and repeat kinds.
    enhanced: bool,
    keys_down: HashSet<Key>,
    text_input: bool,
}

impl TermPlatform {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(err) = execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste,
            Hide
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        // Only trust release tracking where the terminal advertises the
        // enhancement protocol; tmux, mosh, and older emulators do not.
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        Ok(Self {
            enhanced,
            keys_down: HashSet::new(),
            text_input: false,
        })
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> io::Result<(i32, i32)> {
        let (w, h) = terminal::size()?;
        Ok((w as i32, h as i32))
    }

    fn convert_key(&mut self, ev: event::KeyEvent) -> Option<RawEvent> {
        let key = map_key(ev.code);
        match ev.kind {
            KeyEventKind::Release => {
                if let Some(key) = key {
                    self.keys_down.remove(&key);
                }
                return None;
            }
            // With held tracking live, cadence comes from the runtime's
            // repeat timers; the terminal's own repeats would double it.
            KeyEventKind::Repeat if self.enhanced => return None,
            _ => {}
        }
        let modifiers = Modifiers {
            shift: ev.modifiers.contains(KeyModifiers::SHIFT),
            ctrl: ev.modifiers.contains(KeyModifiers::CONTROL),
            alt: ev.modifiers.contains(KeyModifiers::ALT),
            meta: ev.modifiers.contains(KeyModifiers::SUPER),
        };
        if modifiers.ctrl && ev.code == KeyCode::Char('c') {
            return Some(RawEvent::Quit);
        }
        let key = key?;
        if self.enhanced {
            self.keys_down.insert(key);
        }
        Some(RawEvent::Key(KeyEvent {
            key,
            modifiers,
            is_repeat: ev.kind == KeyEventKind::Repeat,
        }))
    }

    fn convert(&mut self, ev: event::Event) -> Option<RawEvent> {
        match ev {
            event::Event::Key(key) => self.convert_key(key),
            event::Event::Mouse(mouse) => convert_mouse(mouse),
            event::Event::Paste(text) => Some(RawEvent::Text(TextEvent::Commit(text))),
            event::Event::Resize(w, h) => Some(RawEvent::Resized {
                w: w as i32,
                h: h as i32,
            }),
            event::Event::FocusGained => Some(RawEvent::Exposed),
            event::Event::FocusLost => None,
        }
    }
}

impl Drop for TermPlatform {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            io::stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            Show,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

impl HeldKeys for TermPlatform {
    fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

impl Platform for TermPlatform {
    fn poll_event(&mut self) -> Result<Option<RawEvent>, PlatformError> {
        while event::poll(Duration::ZERO)? {
            if let Some(raw) = self.convert(event::read()?) {
                return Ok(Some(raw));
            }
        }
        Ok(None)
    }

    fn pad_count(&self) -> usize {
        0
    }

    fn pad(&self, _index: usize) -> Option<&dyn Gamepad> {
        None
    }

    fn present(&mut self, scene: &Scene) -> Result<(), PlatformError> {
        let (w, h, cells) = rasterize(scene);
        let mut out = Vec::with_capacity(w * h * 4);
        queue!(out, BeginSynchronizedUpdate)?;
        let mut last_fg = None;
        let mut last_bg = None;
        for row in 0..h {
            queue!(out, MoveTo(0, row as u16))?;
            for cell in &cells[row * w..(row + 1) * w] {
                if last_bg != Some(cell.bg) {
                    queue!(out, SetBackgroundColor(term_color(cell.bg)))?;
                    last_bg = Some(cell.bg);
                }
                if last_fg != Some(cell.fg) {
                    queue!(out, SetForegroundColor(term_color(cell.fg)))?;
                    last_fg = Some(cell.fg);
                }
                queue!(out, Print(&cell.glyph))?;
            }
        }
        queue!(out, EndSynchronizedUpdate)?;
        let mut stdout = io::stdout();
        stdout.write_all(&out)?;
        stdout.flush()?;
        Ok(())
    }

    fn delay(&mut self, d: Duration) {
        std::thread::sleep(d);
    }

    fn set_text_input(&mut self, active: bool) {
        self.text_input = active;
    }

    fn text_input_active(&self) -> bool {
        self.text_input
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let _ = if visible {
            execute!(io::stdout(), Show)
        } else {
            execute!(io::stdout(), Hide)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_platform(enhanced: bool) -> TermPlatform {
        TermPlatform {
            enhanced,
            keys_down: HashSet::new(),
            text_input: false,
        }
    }

    #[test]
    fn test_map_key_covers_the_bindings() {
        assert_eq!(map_key(KeyCode::Char('q')), Some(Key::Character('q')));
        assert_eq!(map_key(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(map_key(KeyCode::Up), Some(Key::ArrowUp));
        assert_eq!(map_key(KeyCode::Insert), Some(Key::Insert));
        assert_eq!(map_key(KeyCode::F(5)), Some(Key::F(5)));
        assert_eq!(map_key(KeyCode::CapsLock), None);
    }

    #[test]
    fn test_ctrl_c_becomes_quit() {
        let mut platform = plain_platform(false);
        let ev = event::KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(platform.convert_key(ev), Some(RawEvent::Quit)));
        let plain = event::KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(matches!(platform.convert_key(plain), Some(RawEvent::Key(_))));
    }

    #[test]
    fn test_enhanced_terminal_tracks_held_keys() {
        let mut platform = plain_platform(true);
        let mut press = event::KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(platform.convert_key(press).is_some());
        assert!(platform.is_down(Key::ArrowDown));
        // Terminal repeats are swallowed while tracking is live.
        press.kind = KeyEventKind::Repeat;
        assert!(platform.convert_key(press).is_none());
        press.kind = KeyEventKind::Release;
        assert!(platform.convert_key(press).is_none());
        assert!(!platform.is_down(Key::ArrowDown));
    }

    #[test]
    fn test_plain_terminal_reports_nothing_held() {
        let mut platform = plain_platform(false);
        let press = event::KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert!(platform.convert_key(press).is_some());
        assert!(!platform.is_down(Key::ArrowDown));
        // Without enhancement, autorepeat arrives as plain presses and
        // passes straight through.
        let mut repeat = press;
        repeat.kind = KeyEventKind::Repeat;
        match platform.convert_key(repeat) {
            Some(RawEvent::Key(key)) => assert!(key.is_repeat),
            other => panic!("unexpected conversion: {other:?}"),
        }
    }

    #[test]
    fn test_mouse_buttons_and_wheel() {
        let down = event::MouseEvent {
            kind: MouseEventKind::Down(event::MouseButton::Middle),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        match convert_mouse(down) {
            Some(RawEvent::PointerDown { button, x, y }) => {
                assert_eq!(button, PointerButton::Tertiary);
                assert_eq!((x, y), (7, 3));
            }
            other => panic!("unexpected conversion: {other:?}"),
        }
        let scroll = event::MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(
            convert_mouse(scroll),
            Some(RawEvent::Wheel { dx: 0, dy: -1 })
        ));
    }

    #[test]
    fn test_rasterize_layers_text_over_rect() {
        let mut scene = Scene::new(4, 2);
        let red = Color::rgb(200, 0, 0);
        let white = Color::rgb(255, 255, 255);
        scene.rect(Rect::new(0, 0, 4, 2), red);
        scene.text(1, 0, "ab", white, None);
        let (w, _, cells) = rasterize(&scene);
        assert_eq!(cells[1].glyph, "a");
        assert_eq!(cells[1].fg, white);
        // Text without an explicit background keeps the fill underneath.
        assert_eq!(cells[1].bg, red);
        assert_eq!(cells[w + 1].glyph, " ");
        assert_eq!(cells[w + 1].bg, red);
    }

    #[test]
    fn test_rasterize_clips_at_the_edges() {
        let mut scene = Scene::new(3, 1);
        scene.text(-1, 0, "xyz", Color::rgb(9, 9, 9), None);
        scene.text(2, 0, "long tail", Color::rgb(9, 9, 9), None);
        scene.rect(Rect::new(2, -5, 50, 50), Color::rgb(1, 2, 3));
        let (_, _, cells) = rasterize(&scene);
        // "xyz" started one cell off-screen; "long tail" got one cell.
        assert_eq!(cells[0].glyph, "y");
        assert_eq!(cells[1].glyph, "z");
        assert_eq!(cells[2].glyph, " ");
        assert_eq!(cells[2].bg, Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_rasterize_frame_draws_box_glyphs() {
        let mut scene = Scene::new(4, 3);
        let border = Color::rgb(50, 50, 50);
        scene.frame(Rect::new(0, 0, 4, 3), border);
        let (w, _, cells) = rasterize(&scene);
        assert_eq!(cells[0].glyph, "┌");
        assert_eq!(cells[1].glyph, "─");
        assert_eq!(cells[3].glyph, "┐");
        assert_eq!(cells[w].glyph, "│");
        assert_eq!(cells[2 * w + 3].glyph, "┘");
        // Interior untouched.
        assert_eq!(cells[w + 1].glyph, " ");
        assert_eq!(cells[w + 1].bg, TermCell::default().bg);
    }
}
