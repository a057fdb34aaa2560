//! MIDI framing for the surface
//!
//! Classifies raw frames into the message shapes the Mackie protocol uses and
//! provides the 14-bit helpers for the fader channels.

use std::fmt;

/// Start of a System Exclusive frame
pub const SYSEX_START: u8 = 0xF0;

/// End of a System Exclusive frame
pub const SYSEX_END: u8 = 0xF7;

/// First System Real-Time status (clock, start, stop...)
pub const REALTIME_FIRST: u8 = 0xF8;

/// Largest value carried by a 14-bit pitch bend
pub const PB14_MAX: u16 = 0x3FFF;

/// Frame as seen by the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On (0x9n). Velocity 0 is kept as a Note On: the host uses it to
    /// switch LEDs off.
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change (0xBn)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Channel Pressure (0xDn), carries meter levels
    ChannelPressure { channel: u8, pressure: u8 },

    /// Pitch Bend (0xEn), 14-bit fader position
    PitchBend { channel: u8, value: u16 },

    /// System Exclusive payload between 0xF0 and 0xF7.
    ///
    /// `terminated` is false when the frame ended (or hit a stray status
    /// byte) before its 0xF7.
    SysEx { data: Vec<u8>, terminated: bool },

    /// Well-formed status the surface has no use for (Note Off, Program
    /// Change, real-time...)
    Other { status: u8 },
}

impl MidiMessage {
    /// Classify one complete frame. Returns `None` for truncated channel
    /// messages and for data bytes without a status.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;

        // Running status is not used by the surface
        if status < 0x80 {
            return None;
        }

        if status == SYSEX_START {
            return Some(Self::sysex(rest));
        }

        let channel = status & 0x0F;
        let d1 = || rest.first().map(|b| b & 0x7F);
        let d2 = || rest.get(1).map(|b| b & 0x7F);

        let message = match get_type_nibble(status) {
            0x9 => MidiMessage::NoteOn { channel, note: d1()?, velocity: d2()? },
            0xB => MidiMessage::ControlChange { channel, cc: d1()?, value: d2()? },
            0xD => MidiMessage::ChannelPressure { channel, pressure: d1()? },
            0xE => MidiMessage::PitchBend { channel, value: pb14_from_raw(d1()?, d2()?) },
            0x8 | 0xA | 0xC => {
                // Only checked for completeness
                let needed = if get_type_nibble(status) == 0xC { 1 } else { 2 };
                if rest.len() < needed {
                    return None;
                }
                MidiMessage::Other { status }
            }
            _ => MidiMessage::Other { status },
        };
        Some(message)
    }

    /// Real-time bytes may be interleaved and are dropped. Any other status
    /// byte ends the payload; only 0xF7 closes the frame cleanly.
    fn sysex(rest: &[u8]) -> Self {
        let mut data = Vec::with_capacity(rest.len());
        let mut terminated = false;

        for &byte in rest {
            match byte {
                0x00..=0x7F => data.push(byte),
                REALTIME_FIRST..=0xFF => continue,
                _ => {
                    terminated = byte == SYSEX_END;
                    break;
                }
            }
        }

        MidiMessage::SysEx { data, terminated }
    }

    /// Encode to wire bytes; data bytes are masked to 7 bits
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                vec![0xD0 | (channel & 0x0F), pressure & 0x7F]
            }
            MidiMessage::PitchBend { channel, value } => {
                let (lsb, msb) = pb14_split(value);
                vec![0xE0 | (channel & 0x0F), lsb, msb]
            }
            MidiMessage::SysEx { ref data, .. } => {
                let mut frame = Vec::with_capacity(data.len() + 2);
                frame.push(SYSEX_START);
                frame.extend(data.iter().map(|b| b & 0x7F));
                frame.push(SYSEX_END);
                frame
            }
            MidiMessage::Other { status } => vec![status],
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "Note {}/{} = {}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC {}/0x{:02X} = {}", channel + 1, cc, value)
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                write!(f, "Pressure {} = 0x{:02X}", channel + 1, pressure)
            }
            MidiMessage::PitchBend { channel, value } => {
                write!(f, "PitchBend {} = {}", channel + 1, value)
            }
            MidiMessage::SysEx { ref data, terminated } => {
                write!(f, "SysEx [{}]", data.len())?;
                if !terminated {
                    f.write_str(" unterminated")?;
                }
                Ok(())
            }
            MidiMessage::Other { status } => write!(f, "Status 0x{:02X}", status),
        }
    }
}

/// Upper nibble of a status byte (0x8-0xF)
pub fn get_type_nibble(status: u8) -> u8 {
    (status & 0xF0) >> 4
}

/// Combine pitch bend data bytes into a 14-bit value
pub fn pb14_from_raw(lsb: u8, msb: u8) -> u16 {
    (((msb & 0x7F) as u16) << 7) | (lsb & 0x7F) as u16
}

/// Split a 14-bit value into (lsb, msb) 7-bit groups
pub fn pb14_split(value: u16) -> (u8, u8) {
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

/// Space-separated hex dump of a frame
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a frame for the monitor output
pub fn format_frame(timestamp_us: u64, direction: &str, data: &[u8]) -> String {
    let hex = format_hex(data);
    let message = MidiMessage::parse(data)
        .map(|m| format!(" => {}", m))
        .unwrap_or_default();

    format!("[{:010}us] {} | {}{}", timestamp_us, direction, hex, message)
}
