//! Error types for the surface codec and its transport.

/// Errors raised by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The output side is not (or no longer) connected.
    #[error("Not connected to output port")]
    NotConnected,

    /// No port matched the configured name pattern.
    #[error("{direction} port '{pattern}' not found")]
    PortNotFound {
        /// "Input" or "Output".
        direction: &'static str,
        /// The pattern that was searched for.
        pattern: String,
    },

    /// The MIDI backend could not be initialised.
    #[error("Failed to create MIDI client: {0}")]
    Init(String),

    /// Opening a port failed.
    #[error("Failed to connect to port '{port}': {reason}")]
    Connect {
        /// Port name.
        port: String,
        /// Backend message.
        reason: String,
    },

    /// Writing a frame failed.
    #[error("Failed to send MIDI message: {0}")]
    Send(String),

    /// Virtual ports are not available on this platform.
    #[error("Virtual MIDI ports are not supported on this platform")]
    VirtualUnsupported,
}

/// Errors returned by the encoder and the session.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// An index or id was outside its declared range. Nothing was sent.
    #[error("Invalid {what}: {value} (must be 0-{max})")]
    InvalidArgument {
        /// Name of the argument.
        what: &'static str,
        /// The rejected value.
        value: u8,
        /// Largest accepted value.
        max: u8,
    },

    /// The transport rejected a frame.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Crate-level Result alias using [`SurfaceError`].
pub type Result<T> = std::result::Result<T, SurfaceError>;
