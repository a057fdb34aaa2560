//! Inbound frame decoder
//!
//! Classifies every frame the host sends to the surface, applies it to the
//! [`SurfaceState`] and reports the change to an [`EventSink`]. Sysex frames
//! carry the handshake and the bulk display updates.
//!
//! The host is trusted only so far: a short or malformed frame is dropped at
//! the first bad byte. Display cells written before that point stay written,
//! but no event is emitted for a truncated frame.

use tracing::{debug, info, trace};

use crate::midi::{format_hex, MidiMessage};

use super::encoder;
use super::events::{EventSink, SurfaceEvent};
use super::identity::DeviceIdentity;
use super::segment;
use super::state::{
    ConnectionPhase, SurfaceState, VPotMode, VPotRing, FADER_COUNT, LCD_CELLS, MODE_CELLS,
    TIME_CELLS, VPOT_COUNT,
};

/// CC range of the V-Pot LED rings (0x30-0x3F)
const CC_VPOT_RING: u8 = 0x30;

/// CC range of the single 7-segment digits (0x40-0x4F)
const CC_SEGMENT_DIGIT: u8 = 0x40;

/// Sysex commands sent by the host
pub mod command {
    pub const DEVICE_QUERY: u8 = 0x00;
    pub const CHALLENGE_RESPONSE: u8 = 0x02;
    pub const TRANSPORT_CLICK: u8 = 0x0A;
    pub const BACKLIGHT_SAVER: u8 = 0x0B;
    pub const TOUCHLESS_FADERS: u8 = 0x0C;
    pub const TOUCH_SENSITIVITY: u8 = 0x0D;
    pub const GO_OFFLINE: u8 = 0x0F;
    pub const TIME_DISPLAY: u8 = 0x10;
    pub const MODE_DISPLAY: u8 = 0x11;
    pub const LCD: u8 = 0x12;
    pub const VERSION_REQUEST: u8 = 0x13;
    pub const FADERS_TO_MINIMUM: u8 = 0x61;
    pub const ALL_LEDS_OFF: u8 = 0x62;
    pub const RESET: u8 = 0x63;
}

/// Manufacturer id (3) + device byte (1) precede the command
const SYSEX_COMMAND_OFFSET: usize = 4;

/// Decoder owning the surface state of one session
#[derive(Debug, Clone)]
pub struct Decoder {
    state: SurfaceState,
    identity: DeviceIdentity,
}

impl Decoder {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self { state: SurfaceState::new(), identity }
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SurfaceState {
        &mut self.state
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// The transport is up: wait for the host's device query
    pub fn attach(&mut self) {
        if self.state.phase == ConnectionPhase::Disconnected {
            self.set_phase(ConnectionPhase::AwaitingHandshake);
        }
    }

    /// The transport went away
    pub fn detach(&mut self) {
        self.set_phase(ConnectionPhase::Disconnected);
    }

    /// Return to an earlier phase after its reply could not be delivered
    pub(crate) fn restore_phase(&mut self, phase: ConnectionPhase) {
        if self.state.phase != phase {
            debug!("Reply not delivered, staying {}", phase);
            self.set_phase(phase);
        }
    }

    /// Decode one frame.
    ///
    /// Returns the reply frame to send back to the host, if the frame asked
    /// for one.
    pub fn dispatch<S>(&mut self, frame: &[u8], sink: &mut S) -> Option<Vec<u8>>
    where
        S: EventSink + ?Sized,
    {
        trace!("Dispatch: {}", format_hex(frame));

        let Some(message) = MidiMessage::parse(frame) else {
            debug!("Dropping unparseable frame: {}", format_hex(frame));
            return None;
        };

        match message {
            MidiMessage::NoteOn { channel: 0, note, velocity } => {
                self.state.leds[note as usize] = velocity;
                sink.notify(&SurfaceEvent::Led { index: note, velocity });
            }
            MidiMessage::ControlChange { cc, value, .. } => self.control_change(cc, value, sink),
            MidiMessage::ChannelPressure { channel: 0, pressure } => {
                let index = (pressure >> 4) & 0x07;
                let level = pressure & 0x0F;
                self.state.meters[index as usize] = level;
                sink.notify(&SurfaceEvent::Meter { index, level });
            }
            MidiMessage::PitchBend { channel, value } if (channel as usize) < FADER_COUNT => {
                let stored = &mut self.state.faders[channel as usize];
                // Motorized faders echo every move; only report real changes
                if *stored != value {
                    *stored = value;
                    sink.notify(&SurfaceEvent::Fader { channel, value });
                }
            }
            MidiMessage::SysEx { data, terminated } => return self.sysex(&data, terminated, sink),
            other => debug!("Ignoring {}", other),
        }

        None
    }

    fn control_change<S>(&mut self, cc: u8, value: u8, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let index = cc & 0x0F;

        match cc & 0xF0 {
            CC_VPOT_RING => {
                if index as usize >= VPOT_COUNT {
                    debug!("Ignoring V-Pot ring update for index {}", index);
                    return;
                }
                let ring = VPotRing {
                    mode: VPotMode::from_bits(value >> 4),
                    ring: value & 0x0F,
                    center: value & 0x40 != 0,
                };
                self.state.vpots[index as usize] = ring;
                sink.notify(&SurfaceEvent::VPot {
                    index,
                    mode: ring.mode,
                    ring: ring.ring,
                    center: ring.center,
                });
            }
            CC_SEGMENT_DIGIT => {
                let cell = segment::decode(value);
                if (index as usize) < TIME_CELLS {
                    self.state.time[TIME_CELLS - 1 - index as usize] = cell;
                    sink.notify(&SurfaceEvent::Time(self.state.time));
                } else {
                    // Digit 10 is the right assignment digit; 11 and above land on the left one
                    let slot = if index == 10 { 1 } else { 0 };
                    self.state.mode[slot] = cell;
                    sink.notify(&SurfaceEvent::Mode(self.state.mode));
                }
            }
            _ => debug!("Ignoring CC {:02X} = {:02X}", cc, value),
        }
    }

    fn sysex<S>(&mut self, data: &[u8], terminated: bool, sink: &mut S) -> Option<Vec<u8>>
    where
        S: EventSink + ?Sized,
    {
        if data.len() <= SYSEX_COMMAND_OFFSET || !self.identity.matches(data) {
            debug!("Ignoring foreign sysex: {}", format_hex(data));
            return None;
        }

        let cmd = data[SYSEX_COMMAND_OFFSET];
        let payload = &data[SYSEX_COMMAND_OFFSET + 1..];

        match cmd {
            command::DEVICE_QUERY => {
                self.set_phase(ConnectionPhase::AwaitingHandshake);
                return Some(encoder::identity_reply(&self.identity));
            }
            command::CHALLENGE_RESPONSE => {
                self.set_phase(ConnectionPhase::Online);
                sink.notify(&SurfaceEvent::Online);
                return Some(encoder::challenge_confirm(&self.identity));
            }
            command::TRANSPORT_CLICK
            | command::BACKLIGHT_SAVER
            | command::TOUCHLESS_FADERS
            | command::TOUCH_SENSITIVITY => {
                debug!("Configuration command {:02X} accepted: {}", cmd, format_hex(payload));
            }
            command::GO_OFFLINE => {
                self.set_phase(ConnectionPhase::Offline);
                sink.notify(&SurfaceEvent::Offline);
            }
            command::TIME_DISPLAY => self.time_display(payload, terminated, sink),
            command::MODE_DISPLAY => self.mode_display(payload, terminated, sink),
            command::LCD => self.lcd(payload, terminated, sink),
            command::VERSION_REQUEST => return Some(encoder::firmware_reply(&self.identity)),
            command::FADERS_TO_MINIMUM => {
                for channel in 0..FADER_COUNT as u8 {
                    self.state.faders[channel as usize] = 0;
                    sink.notify(&SurfaceEvent::Fader { channel, value: 0 });
                }
            }
            command::ALL_LEDS_OFF => {
                for (index, led) in self.state.leds.iter_mut().enumerate() {
                    *led = 0;
                    sink.notify(&SurfaceEvent::Led { index: index as u8, velocity: 0 });
                }
            }
            command::RESET => {
                self.state.reset();
                info!("Surface reset by host");
                sink.notify(&SurfaceEvent::Reset);
            }
            other => debug!("Ignoring sysex command {:02X}", other),
        }

        None
    }

    /// Up to ten digits, written from the rightmost cell leftwards
    fn time_display<S>(&mut self, payload: &[u8], terminated: bool, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        for (i, &byte) in payload.iter().take(TIME_CELLS).enumerate() {
            self.state.time[TIME_CELLS - 1 - i] = segment::decode(byte);
        }

        if !terminated {
            debug!("Truncated time display frame ({} bytes)", payload.len());
            return;
        }
        sink.notify(&SurfaceEvent::Time(self.state.time));
    }

    /// Two digits: right cell first, then left
    fn mode_display<S>(&mut self, payload: &[u8], terminated: bool, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        for (slot, &byte) in (0..MODE_CELLS).rev().zip(payload) {
            self.state.mode[slot] = segment::decode(byte);
        }

        if !terminated || payload.len() < MODE_CELLS {
            debug!("Truncated mode display frame ({} bytes)", payload.len());
            return;
        }
        sink.notify(&SurfaceEvent::Mode(self.state.mode));
    }

    /// Offset byte followed by characters; anything past the last cell is dropped
    fn lcd<S>(&mut self, payload: &[u8], terminated: bool, sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        let Some((&offset, text)) = payload.split_first() else {
            debug!("LCD frame without offset");
            return;
        };

        let offset = offset as usize;
        if offset >= LCD_CELLS {
            debug!("LCD offset {} out of range", offset);
            return;
        }

        let count = text.len().min(LCD_CELLS - offset);
        self.state.lcd[offset..offset + count].copy_from_slice(&text[..count]);
        if count < text.len() {
            debug!("LCD write at {} discarded {} bytes", offset, text.len() - count);
        }

        if !terminated {
            debug!("Truncated LCD frame at offset {}", offset);
            return;
        }

        let (top, bottom) = self.state.lcd();
        sink.notify(&SurfaceEvent::Lcd { top, bottom });
    }

    fn set_phase(&mut self, phase: ConnectionPhase) {
        if self.state.phase != phase {
            info!("Connection phase: {} -> {}", self.state.phase, phase);
            self.state.phase = phase;
        }
    }
}
