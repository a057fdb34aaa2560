//! Connected surface session
//!
//! A [`Session`] is created once the transport is up and dropped when it goes
//! away. It feeds inbound frames to the [`Decoder`], writes the decoder's
//! replies back to the host and offers the application-side controls.

use tracing::{debug, info};

use crate::error::Result;
use crate::transport::Transport;

use super::decoder::Decoder;
use super::encoder;
use super::events::EventSink;
use super::identity::DeviceIdentity;
use super::state::SurfaceState;

/// One surface connected to one host
pub struct Session<T, S> {
    decoder: Decoder,
    transport: T,
    sink: S,
}

impl<T, S> Session<T, S>
where
    T: Transport,
    S: EventSink,
{
    /// Start a session on an open transport; the surface waits for the
    /// host's device query.
    pub fn new(identity: DeviceIdentity, transport: T, sink: S) -> Self {
        let mut decoder = Decoder::new(identity);
        decoder.attach();
        info!("Surface session started (model 0x{:02X})", decoder.identity().model_id);

        Self { decoder, transport, sink }
    }

    /// Decode one inbound frame and send the reply it asks for, if any.
    ///
    /// If the reply cannot be sent the connection phase reverts to its value
    /// before the frame. Events already delivered to the sink stay delivered.
    pub fn handle_frame(&mut self, frame: &[u8]) -> Result<()> {
        let phase = self.state().phase();
        if let Some(reply) = self.decoder.dispatch(frame, &mut self.sink) {
            if let Err(e) = self.send(&reply) {
                self.decoder.restore_phase(phase);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> &SurfaceState {
        self.decoder.state()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        self.decoder.identity()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Press a button and keep it held
    pub fn press(&mut self, id: impl Into<u8>) -> Result<()> {
        self.set_button(id.into(), true)
    }

    pub fn release(&mut self, id: impl Into<u8>) -> Result<()> {
        self.set_button(id.into(), false)
    }

    /// Press and immediately release
    pub fn tap(&mut self, id: impl Into<u8>) -> Result<()> {
        let id = id.into();
        self.set_button(id, true)?;
        self.set_button(id, false)
    }

    /// Toggle a button based on its last sent state
    pub fn switch(&mut self, id: impl Into<u8>) -> Result<()> {
        let id = id.into();
        let pressed = self.state().button(id).unwrap_or(false);
        self.set_button(id, !pressed)
    }

    /// Move a fader (value clamped to 0-16383)
    pub fn fader(&mut self, channel: u8, value: i32) -> Result<()> {
        let frame = encoder::fader(channel, value)?;
        self.send(&frame)
    }

    /// Fader touch sensor of a channel strip (8 = master)
    pub fn touch_fader(&mut self, channel: u8, touched: bool) -> Result<()> {
        let frame = encoder::fader_touch(channel, touched)?;
        self.send(&frame)?;
        self.decoder.state_mut().buttons[frame[1] as usize] = touched;
        Ok(())
    }

    pub fn vpot_rotate(&mut self, index: u8, delta: i32) -> Result<()> {
        let frame = encoder::vpot_rotate(index, delta)?;
        self.send(&frame)
    }

    pub fn jog_wheel(&mut self, delta: i32) -> Result<()> {
        self.send(&encoder::jog_wheel(delta))
    }

    /// Send an external controller value (clamped to 0-127)
    pub fn external_controller(&mut self, value: i32) -> Result<()> {
        let frame = encoder::external_controller(value);
        self.send(&frame)?;
        self.decoder.state_mut().external_controller = frame[2];
        Ok(())
    }

    /// End the session and hand the transport back
    pub fn close(mut self) -> T {
        self.decoder.detach();
        info!("Surface session closed");
        self.transport
    }

    fn set_button(&mut self, id: u8, pressed: bool) -> Result<()> {
        let frame = encoder::button(id, pressed)?;
        self.send(&frame)?;
        self.decoder.state_mut().buttons[id as usize] = pressed;
        Ok(())
    }

    fn send(&self, frame: &[u8]) -> Result<()> {
        self.transport.send(frame)?;
        debug!("Surface -> host: {} bytes", frame.len());
        Ok(())
    }
}
