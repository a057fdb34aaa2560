//! 7-segment character codes
//!
//! The time code and assignment displays receive one byte per digit. Bits 0-5
//! select the character, bit 6 lights the decimal point.

use std::fmt;

/// One digit of a 7-segment display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCell {
    pub ch: char,
    pub dot: bool,
}

impl DisplayCell {
    /// Unlit digit
    pub const BLANK: DisplayCell = DisplayCell { ch: ' ', dot: false };
}

impl Default for DisplayCell {
    fn default() -> Self {
        Self::BLANK
    }
}

impl fmt::Display for DisplayCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dot {
            write!(f, "{}.", self.ch)
        } else {
            write!(f, "{}", self.ch)
        }
    }
}

/// Decode a segment byte into a character and its decimal-point flag.
///
/// Bytes above 0x7F never appear in a valid payload; the high bit is dropped.
pub fn decode(byte: u8) -> DisplayCell {
    let b = byte & 0x7F;
    let (code, dot) = match b {
        0x00..=0x1F => (b + 0x40, false),
        0x20..=0x3F => (b, false),
        0x40..=0x5F => (b, true),
        _ => (b - 0x40, true),
    };
    DisplayCell { ch: char::from(code), dot }
}

/// Render a run of cells, dots included
pub fn render(cells: &[DisplayCell]) -> String {
    cells.iter().map(ToString::to_string).collect()
}
