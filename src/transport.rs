//! MIDI transport for the surface
//!
//! The codec only needs [`Transport::send`] plus a stream of complete inbound
//! frames. [`MidiTransport`] provides both on top of `midir`, either on
//! existing ports (matched by name) or on freshly created virtual ports.

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MidiConfig;
use crate::error::TransportError;
use crate::midi::format_hex;

/// Capacity of the inbound frame queue
const INBOUND_QUEUE: usize = 1000;

/// Outbound side of a connection
pub trait Transport {
    /// Write one complete frame
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }
}

/// Frame received from the host
#[derive(Debug, Clone)]
pub struct InboundFrame {
    /// Backend timestamp in microseconds
    pub timestamp_us: u64,
    pub data: Vec<u8>,
}

/// midir-backed transport
pub struct MidiTransport {
    /// MIDI input connection
    input_conn: Option<MidiInputConnection<()>>,

    /// MIDI output connection; the lock keeps sysex frames from interleaving
    output_conn: Option<Mutex<MidiOutputConnection>>,

    /// Inbound frame receiver, handed out once
    frame_rx: Option<mpsc::Receiver<InboundFrame>>,

    /// Human-readable names of the connected ports
    port_names: (String, String),
}

impl MidiTransport {
    /// Open the ports described by the config
    pub fn connect(config: &MidiConfig) -> Result<Self, TransportError> {
        let (frame_tx, frame_rx) = mpsc::channel(INBOUND_QUEUE);

        let on_frame = move |timestamp_us: u64, data: &[u8], _: &mut ()| {
            let frame = InboundFrame { timestamp_us, data: data.to_vec() };
            // Never block the backend thread
            if let Err(e) = frame_tx.try_send(frame) {
                warn!("Dropping inbound frame: {}", e);
            }
        };

        let mut midi_in = MidiInput::new(&format!("{}-in", config.client_name))
            .map_err(|e| TransportError::Init(e.to_string()))?;
        let midi_out = MidiOutput::new(&format!("{}-out", config.client_name))
            .map_err(|e| TransportError::Init(e.to_string()))?;

        // The surface receives everything, sysex included
        midi_in.ignore(midir::Ignore::None);

        let (input_conn, output_conn) = if config.virtual_ports {
            Self::open_virtual(midi_in, midi_out, config, on_frame)?
        } else {
            Self::open_existing(midi_in, midi_out, config, on_frame)?
        };

        let port_names = (config.input_port.clone(), config.output_port.clone());
        info!("MIDI transport ready - Input: '{}', Output: '{}'", port_names.0, port_names.1);

        Ok(Self {
            input_conn: Some(input_conn),
            output_conn: Some(Mutex::new(output_conn)),
            frame_rx: Some(frame_rx),
            port_names,
        })
    }

    fn open_existing<F>(
        midi_in: MidiInput,
        midi_out: MidiOutput,
        config: &MidiConfig,
        on_frame: F,
    ) -> Result<(MidiInputConnection<()>, MidiOutputConnection), TransportError>
    where
        F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
    {
        let (in_port, in_name) = discovery::find_input_port(&midi_in, &config.input_port)
            .ok_or_else(|| TransportError::PortNotFound {
                direction: "Input",
                pattern: config.input_port.clone(),
            })?;
        let (out_port, out_name) = discovery::find_output_port(&midi_out, &config.output_port)
            .ok_or_else(|| TransportError::PortNotFound {
                direction: "Output",
                pattern: config.output_port.clone(),
            })?;

        info!("Connecting to input port: {}", in_name);
        let input_conn = midi_in
            .connect(&in_port, &config.client_name, on_frame, ())
            .map_err(|e| TransportError::Connect { port: in_name.clone(), reason: e.to_string() })?;

        info!("Connecting to output port: {}", out_name);
        let output_conn = midi_out
            .connect(&out_port, &config.client_name)
            .map_err(|e| TransportError::Connect { port: out_name.clone(), reason: e.to_string() })?;

        Ok((input_conn, output_conn))
    }

    #[cfg(unix)]
    fn open_virtual<F>(
        midi_in: MidiInput,
        midi_out: MidiOutput,
        config: &MidiConfig,
        on_frame: F,
    ) -> Result<(MidiInputConnection<()>, MidiOutputConnection), TransportError>
    where
        F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
    {
        use midir::os::unix::{VirtualInput, VirtualOutput};

        info!("Creating virtual ports '{}' / '{}'", config.input_port, config.output_port);
        let input_conn = midi_in
            .create_virtual(&config.input_port, on_frame, ())
            .map_err(|e| TransportError::Connect {
                port: config.input_port.clone(),
                reason: e.to_string(),
            })?;
        let output_conn = midi_out
            .create_virtual(&config.output_port)
            .map_err(|e| TransportError::Connect {
                port: config.output_port.clone(),
                reason: e.to_string(),
            })?;

        Ok((input_conn, output_conn))
    }

    #[cfg(not(unix))]
    fn open_virtual<F>(
        _midi_in: MidiInput,
        _midi_out: MidiOutput,
        _config: &MidiConfig,
        _on_frame: F,
    ) -> Result<(MidiInputConnection<()>, MidiOutputConnection), TransportError>
    where
        F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
    {
        Err(TransportError::VirtualUnsupported)
    }

    /// Take the inbound frame receiver (for the session loop to consume)
    pub fn take_frame_receiver(&mut self) -> Option<mpsc::Receiver<InboundFrame>> {
        self.frame_rx.take()
    }

    /// Names of the (input, output) ports
    pub fn port_names(&self) -> (&str, &str) {
        (&self.port_names.0, &self.port_names.1)
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.input_conn.is_some() && self.output_conn.is_some()
    }

    /// Close both ports
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.input_conn.take() {
            conn.close();
        }
        if let Some(conn) = self.output_conn.take() {
            conn.into_inner().close();
        }
        info!("MIDI transport disconnected");
    }
}

impl Transport for MidiTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let output = self.output_conn.as_ref().ok_or(TransportError::NotConnected)?;

        output.lock().send(bytes).map_err(|e| TransportError::Send(e.to_string()))?;

        debug!("Sent: {}", format_hex(bytes));
        Ok(())
    }
}

impl Drop for MidiTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            self.disconnect();
        }
    }
}

/// Port discovery utilities
pub mod discovery {
    use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputPort};
    use tracing::debug;

    use crate::error::TransportError;

    /// Information about a MIDI port
    #[derive(Debug, Clone)]
    pub struct PortInfo {
        pub index: usize,
        pub name: String,
    }

    /// Case-insensitive substring match
    pub fn name_matches(name: &str, pattern: &str) -> bool {
        name.to_lowercase().contains(&pattern.to_lowercase())
    }

    /// Find an input port by substring match
    pub fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(MidiInputPort, String)> {
        midi_in.ports().into_iter().find_map(|port| {
            let name = midi_in.port_name(&port).ok()?;
            if name_matches(&name, pattern) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                Some((port, name))
            } else {
                None
            }
        })
    }

    /// Find an output port by substring match
    pub fn find_output_port(
        midi_out: &MidiOutput,
        pattern: &str,
    ) -> Option<(MidiOutputPort, String)> {
        midi_out.ports().into_iter().find_map(|port| {
            let name = midi_out.port_name(&port).ok()?;
            if name_matches(&name, pattern) {
                debug!("Found port '{}' matching pattern '{}'", name, pattern);
                Some((port, name))
            } else {
                None
            }
        })
    }

    /// Discover input ports
    pub fn discover_input_ports() -> Result<Vec<PortInfo>, TransportError> {
        let midi_in =
            MidiInput::new("mcu-surface-discovery").map_err(|e| TransportError::Init(e.to_string()))?;

        Ok(midi_in
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                midi_in.port_name(port).ok().map(|name| PortInfo { index, name })
            })
            .collect())
    }

    /// Discover output ports
    pub fn discover_output_ports() -> Result<Vec<PortInfo>, TransportError> {
        let midi_out = MidiOutput::new("mcu-surface-discovery")
            .map_err(|e| TransportError::Init(e.to_string()))?;

        Ok(midi_out
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(index, port)| {
                midi_out.port_name(port).ok().map(|name| PortInfo { index, name })
            })
            .collect())
    }

}
