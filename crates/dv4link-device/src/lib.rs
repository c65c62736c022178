//! Device layer for DV4mini-style radio modems.
//!
//! A [`Device`] owns one transport and runs two background threads:
//!
//! - a keepalive loop that sets mode and power once, then keeps asking the
//!   firmware for buffered receive data and, every few ticks, for a
//!   watchdog status frame
//! - a receive loop that decodes incoming bytes and hands each frame to a
//!   [`FrameSink`]
//!
//! Both loops and any number of caller threads send through a single
//! [`TransmitGate`], so frames never interleave on the wire. One
//! [`ShutdownSignal`] stops both loops, whether it is fired by
//! [`Device::close`] or by a fatal receive error.
//!
//! ```no_run
//! use std::sync::mpsc;
//!
//! use dv4link_device::{Device, DeviceConfig, Frame, Mode};
//!
//! let (tx, rx) = mpsc::channel::<Frame>();
//! let mut device = Device::open("/dev/ttyACM0", DeviceConfig::default(), tx)?;
//! device.set_frequency(438_000_000)?;
//! device.set_mode(Mode::Dmr)?;
//! device.transmit(b"hello")?;
//!
//! for frame in rx.iter().take(10) {
//!     println!("{} bytes under command {}", frame.payload.len(), frame.command);
//! }
//! device.close();
//! # Ok::<(), dv4link_device::DeviceError>(())
//! ```

pub mod commander;
pub mod config;
pub mod device;
pub mod error;
pub mod gate;
mod keepalive;
mod receive;
pub mod shutdown;
pub mod sink;

#[cfg(test)]
mod test_support;

pub use commander::{Commander, MAX_TX_DATA};
pub use config::{DeviceConfig, Mode, TxPower};
pub use device::Device;
pub use dv4link_frame::Frame;
pub use error::{DeviceError, Result};
pub use gate::TransmitGate;
pub use shutdown::ShutdownSignal;
pub use sink::FrameSink;
