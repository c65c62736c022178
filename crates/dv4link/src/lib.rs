//! Host-side driver for DV4mini-style serial radio modems.
//!
//! The modem talks a small framed protocol over a USB serial line: every
//! message is a 4-byte preamble, a command ID, a length byte and up to 255
//! payload bytes. This crate bundles the layers that implement it.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access
//! - [`frame`]: frame encoding and the resynchronizing decoder
//! - [`device`]: command facade, transmit gate and the keepalive/receive loops
//!
//! ```no_run
//! use dv4link::device::{Device, DeviceConfig, Frame, Mode};
//!
//! let mut device = Device::open("/dev/ttyACM0", DeviceConfig::default(), |frame: Frame| {
//!     println!("{} ({} bytes)", dv4link::frame::command_name(frame.command), frame.payload.len());
//! })?;
//! device.set_frequency(145_500_000)?;
//! device.set_mode(Mode::DStar)?;
//! device.close();
//! # Ok::<(), dv4link::device::DeviceError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use dv4link_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use dv4link_frame::*;
}

/// Re-export device types.
pub mod device {
    pub use dv4link_device::*;
}
