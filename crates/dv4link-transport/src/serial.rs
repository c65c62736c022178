use std::io::{Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tracing::info;

use crate::error::{Result, TransportError};

/// Baud rate the DV4mini firmware listens on.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Line settings applied when a serial link is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Upper bound on a single blocking read.
    ///
    /// A read that times out returns `ErrorKind::TimedOut`; readers treat that
    /// as "no bytes yet" so they can re-check their shutdown state.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// An open serial device. Implements `Read + Write`.
///
/// Use [`SerialLink::try_clone`] to split the link into a reader half and a
/// writer half owned by different threads. Dropping the last handle closes
/// the device.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialLink {
    /// Open a serial device by name (e.g. `/dev/ttyACM0`, `COM3`).
    pub fn open(name: &str, config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(name, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                name: name.to_string(),
                source,
            })?;

        info!(port = name, baud = config.baud_rate, "opened serial link");

        Ok(Self {
            port,
            name: name.to_string(),
        })
    }

    /// Try to clone this link (creates a new handle to the same device).
    pub fn try_clone(&self) -> Result<Self> {
        let port = self
            .port
            .try_clone()
            .map_err(|source| TransportError::Io(source.into()))?;
        Ok(Self {
            port,
            name: self.name.clone(),
        })
    }

    /// The device name this link was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("name", &self.name)
            .finish()
    }
}

/// A serial port visible on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device name to pass to [`SerialLink::open`].
    pub name: String,
    /// Bus kind: `usb`, `pci`, `bluetooth` or `unknown`.
    pub kind: &'static str,
    /// USB product string, when the OS reports one.
    pub product: Option<String>,
}

/// List the serial ports available on this host.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, product) = match port.port_type {
                SerialPortType::UsbPort(usb) => ("usb", usb.product),
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: port.port_name,
                kind,
                product,
            }
        })
        .collect())
}
