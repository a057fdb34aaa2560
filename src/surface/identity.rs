//! Device identity used for the connection handshake
//!
//! A host talking to a Mackie Control first queries the device, receives the
//! serial number and a challenge, answers the challenge and is then confirmed.
//! The emulated surface always confirms.

/// Mackie manufacturer id, as sent after 0xF0
pub const MANUFACTURER_ID: [u8; 3] = [0x00, 0x00, 0x66];

/// Model byte of a Mackie Control main unit
pub const MODEL_MACKIE_CONTROL: u8 = 0x14;

/// Model byte of a Logic Control main unit
pub const MODEL_LOGIC_CONTROL: u8 = 0x10;

pub const SERIAL_LEN: usize = 7;
pub const CHALLENGE_LEN: usize = 4;
pub const VERSION_LEN: usize = 5;

/// Handshake replies sent by the surface
pub mod reply {
    /// Serial number and challenge, answers a device query
    pub const IDENTITY: u8 = 0x01;
    /// Connection confirmed, answers a challenge response
    pub const CONFIRM: u8 = 0x03;
    /// Firmware version, answers a version request
    pub const VERSION: u8 = 0x14;
}

/// Fixed identity fields of the emulated surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub model_id: u8,
    pub serial: [u8; SERIAL_LEN],
    pub challenge: [u8; CHALLENGE_LEN],
    pub firmware_version: [u8; VERSION_LEN],
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            model_id: MODEL_MACKIE_CONTROL,
            serial: *b"MCS0001",
            challenge: *b"a1b2",
            firmware_version: *b"1.0.0",
        }
    }
}

impl DeviceIdentity {
    /// Sysex header: manufacturer id followed by the model byte
    pub fn header(&self) -> [u8; 4] {
        let [a, b, c] = MANUFACTURER_ID;
        [a, b, c, self.model_id & 0x7F]
    }

    /// Check whether a sysex payload (bytes after 0xF0) is addressed to a
    /// Mackie surface. The model/device byte is not compared.
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.starts_with(&MANUFACTURER_ID)
    }

    /// Build a complete reply frame: `F0 header command body F7`
    pub(crate) fn frame(&self, command: u8, body: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::with_capacity(7 + body.iter().map(|b| b.len()).sum::<usize>());
        out.push(crate::midi::SYSEX_START);
        out.extend_from_slice(&self.header());
        out.push(command);
        for part in body {
            out.extend(part.iter().map(|b| b & 0x7F));
        }
        out.push(crate::midi::SYSEX_END);
        out
    }
}
