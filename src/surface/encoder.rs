//! Outbound frame builders
//!
//! Every builder validates its arguments before producing bytes, so a
//! rejected call never results in a partial write. None of them look at the
//! connection phase; whether a frame should be sent is up to the caller.

use crate::error::{Result, SurfaceError};
use crate::midi::MidiMessage;

use super::identity::{reply, DeviceIdentity};
use super::state::{FADER_COUNT, FADER_MAX, NOTE_COUNT, VPOT_COUNT};

/// CC number of the first V-Pot rotation controller
pub const CC_VPOT_ROTATE: u8 = 0x10;

/// CC number of the external controller (foot pedal) input
pub const CC_EXTERNAL_CONTROLLER: u8 = 0x2E;

/// CC number of the jog wheel
pub const CC_JOG_WHEEL: u8 = 0x3C;

/// Velocity of a pressed button
pub const PRESSED: u8 = 0x7F;

/// Note of the first fader touch sensor
const FADER_TOUCH_FIRST: u8 = 0x68;

const DELTA_MAX: u32 = 63;
const DIRECTION_CCW: u8 = 0x40;

/// Button press or release: `[0x90, id, 0x7F|0x00]`
pub fn button(id: impl Into<u8>, pressed: bool) -> Result<Vec<u8>> {
    let note = check_index("button id", id.into(), NOTE_COUNT)?;
    let velocity = if pressed { PRESSED } else { 0x00 };
    Ok(MidiMessage::NoteOn { channel: 0, note, velocity }.encode())
}

/// Fader position on channel 0-8. The value is clamped to 0-16383.
pub fn fader(channel: u8, value: i32) -> Result<Vec<u8>> {
    let channel = check_index("fader channel", channel, FADER_COUNT)?;
    let value = value.clamp(0, FADER_MAX as i32) as u16;
    Ok(MidiMessage::PitchBend { channel, value }.encode())
}

/// Fader touch sensor of strip 0-7, or 8 for the master fader
pub fn fader_touch(channel: u8, touched: bool) -> Result<Vec<u8>> {
    let channel = check_index("fader channel", channel, FADER_COUNT)?;
    button(FADER_TOUCH_FIRST + channel, touched)
}

/// Relative V-Pot rotation. Negative deltas turn counter-clockwise.
pub fn vpot_rotate(index: u8, delta: i32) -> Result<Vec<u8>> {
    let index = check_index("vpot index", index, VPOT_COUNT)?;
    Ok(relative(CC_VPOT_ROTATE | index, delta))
}

/// Relative jog wheel movement
pub fn jog_wheel(delta: i32) -> Vec<u8> {
    relative(CC_JOG_WHEEL, delta)
}

/// External controller position, clamped to 0-127
pub fn external_controller(value: i32) -> Vec<u8> {
    let value = value.clamp(0, 0x7F) as u8;
    MidiMessage::ControlChange { channel: 0, cc: CC_EXTERNAL_CONTROLLER, value }.encode()
}

/// Answer to a device query: serial number and challenge
pub fn identity_reply(identity: &DeviceIdentity) -> Vec<u8> {
    identity.frame(reply::IDENTITY, &[&identity.serial, &identity.challenge])
}

/// Connection confirmation, answers the host's challenge response
pub fn challenge_confirm(identity: &DeviceIdentity) -> Vec<u8> {
    identity.frame(reply::CONFIRM, &[&identity.serial])
}

/// Answer to a firmware version request
pub fn firmware_reply(identity: &DeviceIdentity) -> Vec<u8> {
    identity.frame(reply::VERSION, &[&identity.firmware_version])
}

/// Sign/magnitude data byte: bit 6 is the direction, bits 0-5 the magnitude
pub fn relative_value(delta: i32) -> u8 {
    let magnitude = delta.unsigned_abs().min(DELTA_MAX) as u8;
    if delta < 0 {
        DIRECTION_CCW | magnitude
    } else {
        magnitude
    }
}

fn relative(cc: u8, delta: i32) -> Vec<u8> {
    MidiMessage::ControlChange { channel: 0, cc, value: relative_value(delta) }.encode()
}

fn check_index(what: &'static str, value: u8, count: usize) -> Result<u8> {
    if (value as usize) < count {
        Ok(value)
    } else {
        Err(SurfaceError::InvalidArgument { what, value, max: (count - 1) as u8 })
    }
}
