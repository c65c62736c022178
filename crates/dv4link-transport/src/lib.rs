//! Serial link transport for DV4mini-style radio modems.
//!
//! This is the lowest layer of dv4link. It opens a serial device by name,
//! applies the line settings the modem expects and hands back a plain
//! `Read + Write` stream. Everything else builds on the [`SerialLink`]
//! type provided here, or on any other `Read`/`Write` pair.

pub mod error;
pub mod serial;

pub use error::{Result, TransportError};
pub use serial::{available_ports, PortInfo, SerialConfig, SerialLink, DEFAULT_BAUD_RATE};
