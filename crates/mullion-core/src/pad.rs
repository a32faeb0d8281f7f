//! Controller buttons and trigger synthesis.

/// Physical pad inputs as backends report them, by position on the pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysButton {
    South,
    East,
    West,
    North,
    Back,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

/// Logical buttons windows see, identical across controller branding.
///
/// A, B, X, Y name positions, not labels: A is the bottom button, B the
/// right one, X the left one, Y the top one. Labels are swapped on some
/// vendors' pads, positions are not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PadButton {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    TriggerLeft,
    TriggerRight,
    LeftStick,
    RightStick,
    Start,
    Select,
}

impl PhysButton {
    pub fn to_logical(self) -> PadButton {
        match self {
            PhysButton::South => PadButton::A,
            PhysButton::East => PadButton::B,
            PhysButton::West => PadButton::X,
            PhysButton::North => PadButton::Y,
            PhysButton::Back => PadButton::Select,
            PhysButton::Start => PadButton::Start,
            PhysButton::LeftStick => PadButton::LeftStick,
            PhysButton::RightStick => PadButton::RightStick,
            PhysButton::LeftShoulder => PadButton::LeftShoulder,
            PhysButton::RightShoulder => PadButton::RightShoulder,
            PhysButton::DpadUp => PadButton::Up,
            PhysButton::DpadDown => PadButton::Down,
            PhysButton::DpadLeft => PadButton::Left,
            PhysButton::DpadRight => PadButton::Right,
        }
    }
}

/// Full travel of a signed 16-bit analog axis.
pub const AXIS_RANGE: i32 = 32768;

/// Debounces an analog trigger into discrete presses.
///
/// Fires once when the magnitude crosses half of full travel, and will not
/// fire again until it has dropped back under a quarter. The gap between
/// the two thresholds swallows chatter around either one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriggerLatch {
    down: bool,
}

impl TriggerLatch {
    pub fn update(&mut self, value: i16) -> bool {
        let v = i32::from(value);
        if v < AXIS_RANGE / 4 {
            self.down = false;
        }
        if v > AXIS_RANGE / 2 && !self.down {
            self.down = true;
            return true;
        }
        false
    }

    pub fn is_down(&self) -> bool {
        self.down
    }
}
