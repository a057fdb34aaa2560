//! Mackie/Logic Control surface emulation
//!
//! The host drives the surface with Note-On, CC, Channel Pressure, Pitch Bend
//! and Mackie sysex frames. [`Decoder`] mirrors them into a [`SurfaceState`]
//! and reports each change as a [`SurfaceEvent`]; [`encoder`] builds the
//! frames a physical surface sends back. [`Session`] wires both to a
//! transport.

pub mod buttons;
pub mod decoder;
pub mod encoder;
pub mod events;
pub mod identity;
pub mod segment;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

pub use buttons::ButtonId;
pub use decoder::Decoder;
pub use events::{EventFanout, EventSink, NullSink, SurfaceEvent};
pub use identity::DeviceIdentity;
pub use segment::DisplayCell;
pub use session::Session;
pub use state::{ConnectionPhase, SurfaceState, VPotMode, VPotRing};
