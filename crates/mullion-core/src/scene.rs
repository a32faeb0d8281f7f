//! Draw commands windows emit. Backends decide what one logical unit means
//! on their output; windows never touch pixels or cells directly.

use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b, 255)
    }
}

#[derive(Clone, Debug)]
pub enum DrawCmd {
    /// Filled rectangle.
    Rect { rect: Rect, color: Color },
    /// One-unit-thick border.
    Frame { rect: Rect, color: Color },
    Text {
        x: i32,
        y: i32,
        text: String,
        fg: Color,
        bg: Option<Color>,
    },
}

/// One frame's worth of draw commands, bottom to top.
#[derive(Clone, Debug)]
pub struct Scene {
    pub w: i32,
    pub h: i32,
    pub cmds: Vec<DrawCmd>,
}

impl Scene {
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            w,
            h,
            cmds: Vec::new(),
        }
    }

    pub fn rect(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::Rect { rect, color });
    }

    pub fn frame(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::Frame { rect, color });
    }

    pub fn text(&mut self, x: i32, y: i32, text: impl Into<String>, fg: Color, bg: Option<Color>) {
        self.cmds.push(DrawCmd::Text {
            x,
            y,
            text: text.into(),
            fg,
            bg,
        });
    }
}
