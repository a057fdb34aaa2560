//! In-memory mirror of the control surface
//!
//! One [`SurfaceState`] exists per session. Device-originated fields are only
//! written by the [`Decoder`](super::Decoder); the session records the
//! application-side button and external controller values after sending them.

use std::fmt;

use super::segment::DisplayCell;

/// Button/LED index space (one note number each)
pub const NOTE_COUNT: usize = 128;

/// Channel strips plus the master fader
pub const FADER_COUNT: usize = 9;

/// Largest fader value (14-bit)
pub const FADER_MAX: u16 = crate::midi::PB14_MAX;

pub const VPOT_COUNT: usize = 8;
pub const METER_COUNT: usize = 8;
pub const TIME_CELLS: usize = 10;
pub const MODE_CELLS: usize = 2;

/// Total LCD cells (two rows)
pub const LCD_CELLS: usize = 112;

/// Cells per LCD row
pub const LCD_ROW: usize = LCD_CELLS / 2;

/// LED ring display mode of a V-Pot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VPotMode {
    /// Single LED at the position
    #[default]
    Single,
    /// LEDs from center to the position
    BoostCut,
    /// LEDs from the left up to the position
    Wrap,
    /// LEDs spreading out from center
    Spread,
}

impl VPotMode {
    /// Mode from the two mode bits (5-4) of a ring update
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => VPotMode::Single,
            1 => VPotMode::BoostCut,
            2 => VPotMode::Wrap,
            _ => VPotMode::Spread,
        }
    }
}

/// LED ring state of one V-Pot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VPotRing {
    pub mode: VPotMode,
    /// Ring position, 0-15
    pub ring: u8,
    /// Center LED lit
    pub center: bool,
}

/// Handshake phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    AwaitingHandshake,
    Online,
    Offline,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionPhase::Disconnected => write!(f, "disconnected"),
            ConnectionPhase::AwaitingHandshake => write!(f, "awaiting-handshake"),
            ConnectionPhase::Online => write!(f, "online"),
            ConnectionPhase::Offline => write!(f, "offline"),
        }
    }
}

/// Full surface state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceState {
    pub(crate) buttons: [bool; NOTE_COUNT],
    pub(crate) leds: [u8; NOTE_COUNT],
    pub(crate) faders: [u16; FADER_COUNT],
    pub(crate) vpots: [VPotRing; VPOT_COUNT],
    pub(crate) meters: [u8; METER_COUNT],
    pub(crate) time: [DisplayCell; TIME_CELLS],
    pub(crate) mode: [DisplayCell; MODE_CELLS],
    pub(crate) lcd: [u8; LCD_CELLS],
    pub(crate) external_controller: u8,
    pub(crate) phase: ConnectionPhase,
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self {
            buttons: [false; NOTE_COUNT],
            leds: [0; NOTE_COUNT],
            faders: [0; FADER_COUNT],
            vpots: [VPotRing::default(); VPOT_COUNT],
            meters: [0; METER_COUNT],
            time: [DisplayCell::BLANK; TIME_CELLS],
            mode: [DisplayCell::BLANK; MODE_CELLS],
            lcd: [b' '; LCD_CELLS],
            external_controller: 0,
            phase: ConnectionPhase::Disconnected,
        }
    }
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reinitialize everything except the connection phase
    pub(crate) fn reset(&mut self) {
        let phase = self.phase;
        *self = Self { phase, ..Self::default() };
    }

    /// Pressed state of a button, as last sent by the application
    pub fn button(&self, id: impl Into<u8>) -> Option<bool> {
        self.buttons.get(id.into() as usize).copied()
    }

    /// LED velocity (0-127)
    pub fn led(&self, id: impl Into<u8>) -> Option<u8> {
        self.leds.get(id.into() as usize).copied()
    }

    /// Fader position (0-16383), channel 8 is the master fader
    pub fn fader(&self, channel: u8) -> Option<u16> {
        self.faders.get(channel as usize).copied()
    }

    pub fn vpot(&self, index: u8) -> Option<VPotRing> {
        self.vpots.get(index as usize).copied()
    }

    /// Meter level (0-15)
    pub fn meter(&self, index: u8) -> Option<u8> {
        self.meters.get(index as usize).copied()
    }

    /// Time code display, left to right
    pub fn time(&self) -> &[DisplayCell; TIME_CELLS] {
        &self.time
    }

    /// Assignment display, left to right
    pub fn mode(&self) -> &[DisplayCell; MODE_CELLS] {
        &self.mode
    }

    /// Raw LCD cells
    pub fn lcd_cells(&self) -> &[u8; LCD_CELLS] {
        &self.lcd
    }

    /// LCD as (upper row, lower row)
    pub fn lcd(&self) -> (String, String) {
        let (top, bottom) = self.lcd.split_at(LCD_ROW);
        (lcd_text(top), lcd_text(bottom))
    }

    /// Last external controller value sent by the application
    pub fn external_controller(&self) -> u8 {
        self.external_controller
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn is_online(&self) -> bool {
        self.phase == ConnectionPhase::Online
    }
}

fn lcd_text(cells: &[u8]) -> String {
    cells.iter().map(|&b| char::from(b & 0x7F)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ButtonId;

    #[test]
    fn test_zero_initialized() {
        let state = SurfaceState::new();

        assert_eq!(state.phase(), ConnectionPhase::Disconnected);
        assert_eq!(state.fader(8), Some(0));
        assert_eq!(state.led(ButtonId::Play), Some(0));
        assert_eq!(state.button(127u8), Some(false));
        assert_eq!(state.vpot(7), Some(VPotRing::default()));
        assert_eq!(state.lcd().0, " ".repeat(LCD_ROW));
    }

    #[test]
    fn test_out_of_range_accessors() {
        let state = SurfaceState::new();

        assert_eq!(state.fader(9), None);
        assert_eq!(state.vpot(8), None);
        assert_eq!(state.meter(8), None);
        assert_eq!(state.led(128u8), None);
    }

    #[test]
    fn test_reset_keeps_phase() {
        let mut state = SurfaceState::new();
        state.phase = ConnectionPhase::Online;
        state.faders[3] = 1000;
        state.leds[94] = 127;
        state.lcd[0] = b'X';

        state.reset();

        assert_eq!(state.phase(), ConnectionPhase::Online);
        assert_eq!(state.fader(3), Some(0));
        assert_eq!(state.led(94u8), Some(0));
        assert_eq!(state.lcd_cells()[0], b' ');
    }

    #[test]
    fn test_vpot_mode_bits() {
        assert_eq!(VPotMode::from_bits(0), VPotMode::Single);
        assert_eq!(VPotMode::from_bits(1), VPotMode::BoostCut);
        assert_eq!(VPotMode::from_bits(2), VPotMode::Wrap);
        assert_eq!(VPotMode::from_bits(3), VPotMode::Spread);
    }
}
