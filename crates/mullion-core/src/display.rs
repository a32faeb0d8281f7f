//! Logical screen metrics shared by every window on the stack.

use crate::config::RuntimeConfig;
use crate::geometry::Point;

const ZOOM_MIN: f32 = 0.5;
const ZOOM_MAX: f32 = 4.0;

/// Logical size, scale factors, and physical size of the output.
///
/// Windows lay out in logical units; backends consume `ppu_x`/`ppu_y` to
/// place pixels or cells. `w`/`h` always equal the physical size divided
/// by the scale factors.
#[derive(Clone, Copy, Debug)]
pub struct DisplayMetrics {
    pub w: i32,
    pub h: i32,
    pub ppu_x: f32,
    pub ppu_y: f32,
    pub actual_w: i32,
    pub actual_h: i32,
    base_w: i32,
    base_h: i32,
}

impl DisplayMetrics {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            w: config.base_width,
            h: config.base_height,
            ppu_x: 1.0,
            ppu_y: 1.0,
            actual_w: config.base_width,
            actual_h: config.base_height,
            base_w: config.base_width,
            base_h: config.base_height,
        }
    }

    /// Pick scale factors for a display that differs from the base layout
    /// size. Displays at least twice as wide upscale uniformly, capped at
    /// 2x; other odd sizes run native 1:1.
    pub fn fit_to(&mut self, phys_w: i32, phys_h: i32) {
        if phys_w >= self.base_w * 2 {
            let scale = (phys_w as f32 / self.base_w as f32)
                .min(phys_h as f32 / self.base_h as f32)
                .min(2.0);
            self.ppu_x = scale;
            self.ppu_y = scale;
            self.actual_w = phys_w;
            self.actual_h = phys_h;
            self.w = (phys_w as f32 / scale) as i32;
            self.h = (phys_h as f32 / scale) as i32;
        } else if phys_w != self.base_w {
            self.ppu_x = 1.0;
            self.ppu_y = 1.0;
            self.w = phys_w;
            self.h = phys_h;
            self.actual_w = phys_w;
            self.actual_h = phys_h;
        }
    }

    /// Recompute logical size after the backend reported a new physical
    /// size. Scale factors are kept.
    pub fn resized(&mut self, phys_w: i32, phys_h: i32) {
        self.actual_w = phys_w;
        self.actual_h = phys_h;
        self.w = (phys_w as f32 / self.ppu_x) as i32;
        self.h = (phys_h as f32 / self.ppu_y) as i32;
    }

    /// Scale by `factor` within sane bounds, keeping the physical size.
    pub fn zoom(&mut self, factor: f32) {
        self.ppu_x = (self.ppu_x * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.ppu_y = (self.ppu_y * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.resized(self.actual_w, self.actual_h);
    }

    /// Map a physical pointer position into logical units.
    pub fn to_logical(&self, x: i32, y: i32) -> Point {
        Point {
            x: (x as f32 / self.ppu_x) as i32,
            y: (y as f32 / self.ppu_y) as i32,
        }
    }
}
