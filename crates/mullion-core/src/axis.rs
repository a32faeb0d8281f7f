//! 8-way direction from thumb sticks, rate limited per direction.

use crate::pad::PadButton;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxisX {
    #[default]
    Center,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AxisY {
    #[default]
    Center,
    Up,
    Down,
}

/// Instantaneous 8-way direction of a stick or d-pad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisDir {
    pub x: AxisX,
    pub y: AxisY,
}

impl AxisDir {
    pub fn is_center(self) -> bool {
        self.x == AxisX::Center && self.y == AxisY::Center
    }

    pub fn x_button(self) -> Option<PadButton> {
        match self.x {
            AxisX::Center => None,
            AxisX::Left => Some(PadButton::Left),
            AxisX::Right => Some(PadButton::Right),
        }
    }

    pub fn y_button(self) -> Option<PadButton> {
        match self.y {
            AxisY::Center => None,
            AxisY::Up => Some(PadButton::Up),
            AxisY::Down => Some(PadButton::Down),
        }
    }
}

/// Lets a held direction through at most once per interval, so a stick
/// pinned to one side feels like evenly repeated d-pad presses.
///
/// The X and Y axes are fully independent; a diagonal hold paces each on
/// its own timer. Releasing an axis clears its timestamps, so the next
/// push fires without waiting out the rest of the interval.
pub struct AxisRepeater {
    min_interval_ms: u64,
    last_left: u64,
    last_right: u64,
    last_up: u64,
    last_down: u64,
}

impl AxisRepeater {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_left: 0,
            last_right: 0,
            last_up: 0,
            last_down: 0,
        }
    }

    /// Filter the instantaneous direction, stamping `now` on every axis
    /// that is allowed through.
    pub fn filter(&mut self, mut dir: AxisDir, now: u64) -> AxisDir {
        match dir.x {
            AxisX::Left => {
                self.last_right = 0;
                if now.wrapping_sub(self.last_left) < self.min_interval_ms {
                    dir.x = AxisX::Center;
                } else {
                    self.last_left = now;
                }
            }
            AxisX::Right => {
                self.last_left = 0;
                if now.wrapping_sub(self.last_right) < self.min_interval_ms {
                    dir.x = AxisX::Center;
                } else {
                    self.last_right = now;
                }
            }
            AxisX::Center => {
                self.last_left = 0;
                self.last_right = 0;
            }
        }
        match dir.y {
            AxisY::Up => {
                self.last_down = 0;
                if now.wrapping_sub(self.last_up) < self.min_interval_ms {
                    dir.y = AxisY::Center;
                } else {
                    self.last_up = now;
                }
            }
            AxisY::Down => {
                self.last_up = 0;
                if now.wrapping_sub(self.last_down) < self.min_interval_ms {
                    dir.y = AxisY::Center;
                } else {
                    self.last_down = now;
                }
            }
            AxisY::Center => {
                self.last_up = 0;
                self.last_down = 0;
            }
        }
        dir
    }
}
