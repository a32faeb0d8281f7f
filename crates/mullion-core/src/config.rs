/// Tunables for the modal loop and its input machinery.
///
/// `refresh_rate` doubles as the repeat clock: hold repeats are counted in
/// frames, so changing the frame budget also changes how fast a held key
/// repeats.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuntimeConfig {
    /// Logical width screens lay out against before any scaling.
    pub base_width: i32,
    pub base_height: i32,
    /// Target frames per second when the backend cannot vsync.
    pub refresh_rate: u32,
    /// Hold polls before the first synthetic repeat fires.
    pub repeat_first_delay: u32,
    /// Hold polls between subsequent repeats.
    pub repeat_next_delay: u32,
    /// Minimum gap between discrete events from a held stick direction.
    pub axis_interval_ms: u64,
    /// Raw magnitude below which horizontal stick movement is noise.
    pub deadzone_x: i16,
    /// Raw magnitude below which vertical stick movement is noise.
    pub deadzone_y: i16,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_width: 320,
            base_height: 240,
            refresh_rate: 25,
            repeat_first_delay: 12,
            repeat_next_delay: 3,
            axis_interval_ms: 160,
            deadzone_x: 16000,
            deadzone_y: 4000,
        }
    }
}
