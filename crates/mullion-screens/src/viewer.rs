//! Full-screen text viewer: line scrolling, page jumps, and horizontal
//! panning, all repeating while held.

use std::cell::Cell;

use mullion_core::{
    DisplayMetrics, Gamepad, HeldKeys, HoldTimers, Key, KeyEvent, PadButton, Point, PointerButton,
    Rect, Runtime, RuntimeConfig, Scene, Window, WindowResult,
};

use crate::theme;

/// Refuse to load files beyond this size into the viewer.
pub const MAX_TEXT_SIZE: u64 = 16 * 1024 * 1024;

/// Horizontal pan step in logical units.
const PAN_STEP: usize = 8;

/// Body rows below the title bar.
fn rows_for(screen_h: i32) -> usize {
    (screen_h - 1).max(1) as usize
}

pub struct Viewer {
    result: WindowResult,
    title: String,
    lines: Vec<String>,
    first: Cell<usize>,
    pan: Cell<usize>,
    // Body rows at the current display size; hold polling has no runtime
    // handle, so render and resize keep this current for it.
    visible: Cell<usize>,
    timers: HoldTimers,
}

impl Viewer {
    pub fn new(config: &RuntimeConfig, title: impl Into<String>, text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.trim_end_matches('\r').replace('\t', "    "))
            .collect();
        Self {
            result: WindowResult::new(),
            title: title.into(),
            lines,
            first: Cell::new(0),
            pan: Cell::new(0),
            visible: Cell::new(rows_for(config.base_height)),
            timers: HoldTimers::new(config),
        }
    }

    /// First visible line index.
    pub fn first_line(&self) -> usize {
        self.first.get()
    }

    fn scroll_up(&self, step: usize) -> bool {
        let first = self.first.get();
        if first == 0 {
            return false;
        }
        self.first.set(first.saturating_sub(step));
        true
    }

    fn scroll_down(&self, step: usize, visible: usize) -> bool {
        let first = self.first.get();
        if first + visible >= self.lines.len() {
            return false;
        }
        self.first
            .set((first + step).min(self.lines.len() - visible));
        true
    }

    fn pan_left(&self) -> bool {
        let pan = self.pan.get();
        if pan == 0 {
            return false;
        }
        self.pan.set(pan.saturating_sub(PAN_STEP));
        true
    }

    fn pan_right(&self) -> bool {
        self.pan.set(self.pan.get() + PAN_STEP);
        true
    }

    fn handle_move(&self, key: Key, visible: usize) -> bool {
        match key {
            Key::ArrowUp => self.scroll_up(1),
            Key::ArrowDown => self.scroll_down(1, visible),
            Key::PageUp => self.scroll_up(visible - 1),
            Key::PageDown => self.scroll_down(visible - 1, visible),
            Key::ArrowLeft => self.pan_left(),
            Key::ArrowRight => self.pan_right(),
            _ => false,
        }
    }
}

impl Window for Viewer {
    fn render(&self, scene: &mut Scene, _has_focus: bool) {
        scene.rect(Rect::new(0, 0, scene.w, scene.h), theme::BG_LIGHT);
        scene.rect(Rect::new(0, 0, scene.w, 1), theme::TITLE_BG);
        scene.text(
            0,
            0,
            theme::clip_head(&self.title, scene.w.max(0) as usize),
            theme::TEXT_TITLE,
            None,
        );

        let pan = self.pan.get();
        let width = scene.w.max(0) as usize;
        let visible = rows_for(scene.h);
        self.visible.set(visible);
        for (row, line) in self.lines.iter().skip(self.first.get()).take(visible).enumerate() {
            scene.text(
                0,
                1 + row as i32,
                theme::window(line, pan, width),
                theme::TEXT_NORMAL,
                None,
            );
        }
    }

    fn result(&self) -> &WindowResult {
        &self.result
    }

    fn is_full_screen(&self) -> bool {
        true
    }

    fn on_resize(&self, metrics: &DisplayMetrics) {
        let visible = rows_for(metrics.h);
        self.visible.set(visible);
        // Keep the window within the shorter page.
        if self.first.get() + visible > self.lines.len() {
            self.first
                .set(self.lines.len().saturating_sub(visible));
        }
    }

    fn key_press(&self, rt: &mut Runtime, ev: &KeyEvent) -> bool {
        if !ev.is_repeat {
            self.timers.key_pressed(ev.key);
        }
        match ev.key {
            Key::Escape | Key::Backspace => {
                self.result.cancel();
                true
            }
            key => self.handle_move(key, rows_for(rt.metrics().h)),
        }
    }

    fn button_press(&self, rt: &mut Runtime, button: PadButton) -> bool {
        self.timers.button_pressed(button);
        let visible = rows_for(rt.metrics().h);
        match button {
            PadButton::B => {
                self.result.cancel();
                true
            }
            PadButton::Up => self.scroll_up(1),
            PadButton::Down => self.scroll_down(1, visible),
            PadButton::LeftShoulder => self.scroll_up(visible - 1),
            PadButton::RightShoulder => self.scroll_down(visible - 1, visible),
            PadButton::Left => self.pan_left(),
            PadButton::Right => self.pan_right(),
            _ => false,
        }
    }

    fn mouse_down(&self, _rt: &mut Runtime, button: PointerButton, _pos: Point) -> bool {
        if button == PointerButton::Secondary {
            self.result.cancel();
            return true;
        }
        false
    }

    fn mouse_wheel(&self, rt: &mut Runtime, _dx: i32, dy: i32) -> bool {
        if dy > 0 {
            self.scroll_up(1)
        } else if dy < 0 {
            self.scroll_down(1, rows_for(rt.metrics().h))
        } else {
            false
        }
    }

    fn key_hold(&self, held: &dyn HeldKeys) -> bool {
        for key in [
            Key::ArrowUp,
            Key::ArrowDown,
            Key::PageUp,
            Key::PageDown,
            Key::ArrowLeft,
            Key::ArrowRight,
        ] {
            if self.timers.tick_key(key, held) {
                return self.handle_move(key, self.visible.get());
            }
        }
        false
    }

    fn pad_hold(&self, pad: &dyn Gamepad) -> bool {
        let visible = self.visible.get();
        for button in [
            PadButton::Up,
            PadButton::Down,
            PadButton::LeftShoulder,
            PadButton::RightShoulder,
            PadButton::Left,
            PadButton::Right,
        ] {
            if self.timers.tick_button(button, pad) {
                return match button {
                    PadButton::Up => self.scroll_up(1),
                    PadButton::Down => self.scroll_down(1, visible),
                    PadButton::LeftShoulder => self.scroll_up(visible - 1),
                    PadButton::RightShoulder => self.scroll_down(visible - 1, visible),
                    PadButton::Left => self.pan_left(),
                    _ => self.pan_right(),
                };
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mullion_core::DrawCmd;
    use mullion_core::sim::ScriptedPlatform;
    use mullion_core::{RawEvent, TestClock};
    use std::rc::Rc;

    fn viewer(lines: usize) -> Viewer {
        let text: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
        Viewer::new(&RuntimeConfig::default(), "/tmp/sample.txt", &text.join("\n"))
    }

    #[test]
    fn test_scroll_clamps_to_both_ends() {
        let v = viewer(10);
        assert!(!v.scroll_up(1));
        assert!(v.scroll_down(1, 5));
        assert_eq!(v.first_line(), 1);
        assert!(v.scroll_down(100, 5));
        // Stops once the last line is on screen.
        assert_eq!(v.first_line(), 5);
        assert!(!v.scroll_down(1, 5));
        assert!(v.scroll_up(100));
        assert_eq!(v.first_line(), 0);
    }

    #[test]
    fn test_short_text_never_scrolls() {
        let v = viewer(3);
        assert!(!v.scroll_down(1, 5));
        assert_eq!(v.first_line(), 0);
    }

    #[test]
    fn test_pan_clamps_left_only() {
        let v = viewer(2);
        assert!(!v.pan_left());
        assert!(v.pan_right());
        assert!(v.pan_right());
        assert_eq!(v.pan.get(), 2 * PAN_STEP);
        assert!(v.pan_left());
        assert!(v.pan_left());
        assert!(!v.pan_left());
        assert_eq!(v.pan.get(), 0);
    }

    #[test]
    fn test_tabs_expand_and_crlf_strips() {
        let v = Viewer::new(&RuntimeConfig::default(), "x", "a\tb\r\nnext");
        assert_eq!(v.lines, vec!["a    b", "next"]);
    }

    #[test]
    fn test_escape_and_backspace_close() {
        for key in [Key::Escape, Key::Backspace] {
            let clock = TestClock::new();
            clock.set(1_000);
            let mut platform = ScriptedPlatform::new(clock.clone());
            platform.press_key(key);
            let mut rt = Runtime::new(
                Box::new(platform),
                Box::new(clock),
                RuntimeConfig::default(),
            );
            assert_eq!(rt.run(Rc::new(viewer(4))).unwrap(), 0);
        }
    }

    #[test]
    fn test_render_pans_and_offsets() {
        let v = viewer(10);
        v.first.set(2);
        v.pan.set(5);
        let mut scene = Scene::new(20, 4);
        v.render(&mut scene, true);
        let texts: Vec<(i32, String)> = scene
            .cmds
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { y, text, .. } => Some((*y, text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(texts[0], (0, "/tmp/sample.txt".to_owned()));
        // Three body rows starting at line 2, panned past "line ".
        assert_eq!(texts[1], (1, "2".to_owned()));
        assert_eq!(texts[2], (2, "3".to_owned()));
        assert_eq!(texts[3], (3, "4".to_owned()));
        assert_eq!(texts.len(), 4);
    }

    #[test]
    fn test_wheel_scrolls_one_line() {
        let clock = TestClock::new();
        clock.set(1_000);
        let mut platform = ScriptedPlatform::new(clock.clone());
        platform.push_event(RawEvent::Wheel { dx: 0, dy: -1 });
        platform.wait_frames(1);
        platform.push_event(RawEvent::Wheel { dx: 0, dy: 1 });
        platform.wait_frames(1);
        platform.press_key(Key::Escape);
        let mut rt = Runtime::new(
            Box::new(platform),
            Box::new(clock),
            RuntimeConfig::default(),
        );
        let v = Rc::new(viewer(500));
        rt.run(v.clone()).unwrap();
        assert_eq!(v.first_line(), 0);
    }

    #[test]
    fn test_hold_scrolls_until_release() {
        let clock = TestClock::new();
        clock.set(1_000);
        let mut platform = ScriptedPlatform::new(clock.clone());
        platform.press_key(Key::ArrowDown);
        platform.wait_frames(16);
        platform.release_key(Key::ArrowDown);
        platform.press_key(Key::Escape);
        let mut rt = Runtime::new(
            Box::new(platform),
            Box::new(clock),
            RuntimeConfig::default(),
        );
        let v = Rc::new(viewer(500));
        rt.run(v.clone()).unwrap();
        // One press plus repeats at polls 13 and 16.
        assert_eq!(v.first_line(), 3);
    }
}
