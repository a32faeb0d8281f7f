//! The blocking modal loop.

use std::rc::Rc;

use crate::axis::AxisRepeater;
use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::display::DisplayMetrics;
use crate::error::RuntimeError;
use crate::event::{Event, Key, KeyEvent};
use crate::input::Normalizer;
use crate::pacer::FramePacer;
use crate::platform::{HeldKeys, Platform};
use crate::scene::Scene;
use crate::stack::WindowStack;
use crate::window::{Window, WindowResult};

/// Owns the backend, the clock, and all state shared between nested modal
/// loops: the window stack, the stick debouncer, and the frame pacer.
///
/// One runtime drives one modal chain. Nesting is call-stack nesting: a
/// handler opens a dialog by calling [`run`](Self::run) again and blocks
/// until the dialog produces a result.
pub struct Runtime {
    platform: Box<dyn Platform>,
    clock: Box<dyn Clock>,
    config: RuntimeConfig,
    metrics: DisplayMetrics,
    stack: WindowStack,
    normalizer: Normalizer,
    axis_repeater: AxisRepeater,
    pacer: FramePacer,
    quit: bool,
    cursor_visible: bool,
}

impl Runtime {
    pub fn new(
        mut platform: Box<dyn Platform>,
        clock: Box<dyn Clock>,
        config: RuntimeConfig,
    ) -> Self {
        let metrics = DisplayMetrics::new(&config);
        let normalizer = Normalizer::new(&config);
        let axis_repeater = AxisRepeater::new(config.axis_interval_ms);
        // Handhelds have no pointer until one shows up.
        platform.set_cursor_visible(false);
        Self {
            platform,
            clock,
            config,
            metrics,
            stack: WindowStack::new(),
            normalizer,
            axis_repeater,
            pacer: FramePacer::new(),
            quit: false,
            cursor_visible: false,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn stack(&self) -> &WindowStack {
        &self.stack
    }

    /// Current clock reading in milliseconds.
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Ask every loop on the call stack to unwind. Windows still close in
    /// reverse push order, each reporting its result as it stands.
    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Pick scale factors for the physical display. Call once before the
    /// first [`run`](Self::run), with the backend's real output size.
    pub fn fit_display(&mut self, phys_w: i32, phys_h: i32) {
        self.metrics.fit_to(phys_w, phys_h);
        self.pacer.reset();
        log::debug!(
            "display {}x{} -> logical {}x{} at {:.2}x{:.2}",
            phys_w,
            phys_h,
            self.metrics.w,
            self.metrics.h,
            self.metrics.ppu_x,
            self.metrics.ppu_y,
        );
    }

    /// Run `window` modally until its result is set.
    ///
    /// Blocks. Each iteration drains pending events in arrival order, polls
    /// held pads and keys for synthetic repeats, repaints the whole stack
    /// when something changed, and paces to the configured frame rate. The
    /// returned value is the window's result with plain cancellation
    /// already normalized to zero.
    pub fn run(&mut self, window: Rc<dyn Window>) -> Result<i32, RuntimeError> {
        let guard = self.stack.push(window.clone());
        log::debug!("modal loop enter, depth {}", guard.depth());

        let text_was_active = self.platform.text_input_active();
        self.platform.set_text_input(false);
        if window.handles_text_input() {
            self.platform.set_text_input(true);
        }

        window.result().clear();
        let mut redraw = true;
        'frames: while !self.quit {
            while let Some(raw) = self.platform.poll_event()? {
                let Some(event) = self.normalizer.ingest(raw) else {
                    continue;
                };
                match event {
                    Event::Key(ev) => {
                        self.show_cursor(false);
                        if self.zoom_shortcut(&ev) {
                            redraw = true;
                            continue;
                        }
                        redraw |= window.key_press(self, &ev);
                    }
                    Event::Button(button) => {
                        self.show_cursor(false);
                        redraw |= window.button_press(self, button);
                    }
                    Event::Text(ev) => redraw |= window.text_input(self, &ev),
                    Event::PointerDown { button, x, y } => {
                        self.show_cursor(true);
                        let pos = self.metrics.to_logical(x, y);
                        redraw |= window.mouse_down(self, button, pos);
                    }
                    Event::PointerMoved { .. } => self.show_cursor(true),
                    Event::Wheel { dx, dy } => {
                        self.show_cursor(true);
                        redraw |= window.mouse_wheel(self, dx, dy);
                    }
                    Event::Resized { w, h } => {
                        self.handle_resize(w, h);
                        redraw = true;
                    }
                    Event::Exposed => redraw = true,
                    Event::Quit => {
                        log::debug!("quit event, unwinding {} windows", self.stack.len());
                        self.quit = true;
                        break;
                    }
                }
            }
            if self.quit || window.result().is_set() {
                break 'frames;
            }

            // Held input repeats without fresh events: poll the pads, then
            // the debounced stick direction, then the keyboard.
            for i in 0..self.platform.pad_count() {
                if let Some(pad) = self.platform.pad(i) {
                    redraw |= window.pad_hold(pad);
                }
            }
            let dir = self
                .axis_repeater
                .filter(self.normalizer.held_direction(), self.clock.ticks());
            if let Some(button) = dir.x_button() {
                redraw |= window.button_press(self, button);
            }
            if let Some(button) = dir.y_button() {
                redraw |= window.button_press(self, button);
            }
            let held: &dyn HeldKeys = &*self.platform;
            redraw |= window.key_hold(held);
            if self.quit || window.result().is_set() {
                break 'frames;
            }

            if redraw {
                let mut scene = Scene::new(self.metrics.w, self.metrics.h);
                self.stack.compose(&mut scene);
                self.platform.present(&scene)?;
                redraw = false;
            }
            if let Some(sleep) = self.pacer.pace(self.clock.ticks(), self.config.refresh_rate) {
                self.platform.delay(sleep);
            }
        }

        self.platform.set_text_input(false);
        if text_was_active {
            self.platform.set_text_input(true);
        }
        log::debug!("modal loop exit, depth {}", guard.depth());
        drop(guard);

        let result = window.result().get();
        // Cancellation is loop control, not a caller-visible value.
        Ok(if result == WindowResult::CANCELED { 0 } else { result })
    }

    fn show_cursor(&mut self, visible: bool) {
        if self.cursor_visible != visible {
            self.cursor_visible = visible;
            self.platform.set_cursor_visible(visible);
        }
    }

    /// CTRL with plus or minus rescales the whole UI in 10% steps.
    fn zoom_shortcut(&mut self, ev: &KeyEvent) -> bool {
        if !ev.modifiers.ctrl {
            return false;
        }
        let factor = match ev.key {
            Key::Character('+') => 1.1,
            Key::Character('-') => 1.0 / 1.1,
            _ => return false,
        };
        self.metrics.zoom(factor);
        log::debug!("zoom to {:.2}x{:.2}", self.metrics.ppu_x, self.metrics.ppu_y);
        self.notify_resized();
        true
    }

    fn handle_resize(&mut self, phys_w: i32, phys_h: i32) {
        log::debug!("display resized to {}x{}", phys_w, phys_h);
        self.metrics.resized(phys_w, phys_h);
        self.pacer.reset();
        self.notify_resized();
    }

    /// Every stacked window regenerates its cached layout, not only the
    /// running one.
    fn notify_resized(&mut self) {
        for window in self.stack.snapshot() {
            window.on_resize(&self.metrics);
        }
    }
}
