//! The shared palette and row layout every screen draws with.
//!
//! Panels and viewers lay out in whole logical units: one text row per
//! line, a one-row header bar and a one-row footer bar.

use mullion_core::Color;

pub const TITLE_BG: Color = Color::rgb(102, 85, 74);
pub const TEXT_NORMAL: Color = Color::rgb(70, 27, 10);
pub const TEXT_TITLE: Color = Color::rgb(233, 229, 227);
pub const TEXT_DIR: Color = Color::rgb(75, 70, 164);
pub const TEXT_SELECTED: Color = Color::rgb(255, 0, 0);
pub const CURSOR_FOCUS: Color = Color::rgb(232, 152, 80);
pub const CURSOR_BLUR: Color = Color::rgb(232, 201, 173);
pub const BG_LIGHT: Color = Color::rgb(255, 255, 255);
pub const BG_SHADE: Color = Color::rgb(232, 228, 224);
pub const BORDER: Color = Color::rgb(102, 85, 74);

/// Header bar height in rows.
pub const HEADER_ROWS: i32 = 1;
/// Footer bar height in rows.
pub const FOOTER_ROWS: i32 = 1;

/// First list row of a panel.
pub const Y_LIST: i32 = HEADER_ROWS;

/// List rows available between the header and footer bars.
pub fn list_rows(screen_h: i32) -> usize {
    (screen_h - HEADER_ROWS - FOOTER_ROWS).max(1) as usize
}

/// Width of `text` in logical units (one unit per grapheme).
pub fn text_width(text: &str) -> usize {
    use unicode_segmentation::UnicodeSegmentation;
    text.graphemes(true).count()
}

/// Truncates `text` to at most `max` units, keeping the head.
pub fn clip_tail(text: &str, max: usize) -> String {
    use unicode_segmentation::UnicodeSegmentation;
    if text_width(text) <= max {
        return text.to_owned();
    }
    text.graphemes(true).take(max).collect()
}

/// Truncates `text` to at most `max` units, keeping the tail. Panel headers
/// use this so the most significant end of a long path stays visible.
pub fn clip_head(text: &str, max: usize) -> String {
    use unicode_segmentation::UnicodeSegmentation;
    let width = text_width(text);
    if width <= max {
        return text.to_owned();
    }
    text.graphemes(true).skip(width - max).collect()
}

/// The `max`-unit window of `text` starting `skip` units in. Viewers use
/// this for horizontal panning.
pub fn window(text: &str, skip: usize, max: usize) -> String {
    use unicode_segmentation::UnicodeSegmentation;
    text.graphemes(true).skip(skip).take(max).collect()
}

/// Formats a byte count with thousands separators, `1234567` -> `1,234,567`.
pub fn format_size(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
