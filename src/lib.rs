//! Mackie/Logic Control surface emulation
//!
//! Decodes what a DAW sends to a control surface, mirrors it into
//! [`SurfaceState`](surface::SurfaceState) and builds the frames a surface
//! sends back.

pub mod config;
pub mod error;
pub mod midi;
pub mod surface;
pub mod transport;

pub use error::{Result, SurfaceError, TransportError};
pub use surface::{ButtonId, Decoder, DeviceIdentity, EventSink, Session, SurfaceEvent, SurfaceState};
pub use transport::{MidiTransport, Transport};
