/// Errors that can occur in device operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport-level error (opening or configuring the serial link).
    #[error("transport error: {0}")]
    Transport(#[from] dv4link_transport::TransportError),

    /// Frame-level error (encoding, or I/O while writing a frame).
    #[error("frame error: {0}")]
    Frame(#[from] dv4link_frame::FrameError),

    /// A command argument is outside the range the firmware accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A background task could not be started.
    #[error("failed to start {task} task: {source}")]
    Spawn {
        task: &'static str,
        source: std::io::Error,
    },

    /// A sender panicked while holding the transmit gate.
    #[error("transmit gate poisoned")]
    GatePoisoned,

    /// The device has been closed.
    #[error("device closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DeviceError>;
