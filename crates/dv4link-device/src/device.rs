use std::io::{self, Read, Write};
use std::thread::{self, JoinHandle};

use dv4link_frame::FrameReader;
use dv4link_transport::SerialLink;
use tracing::{info, warn};

use crate::commander::Commander;
use crate::config::{DeviceConfig, Mode};
use crate::error::{DeviceError, Result};
use crate::gate::TransmitGate;
use crate::keepalive::{run_keepalive, KeepaliveSettings};
use crate::receive::run_receive;
use crate::shutdown::ShutdownSignal;
use crate::sink::FrameSink;

const KEEPALIVE_THREAD: &str = "dv4link-keepalive";
const RECEIVE_THREAD: &str = "dv4link-receive";

type Task = Box<dyn FnOnce() + Send + 'static>;

fn spawn_thread(name: &'static str, task: Task) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name.into()).spawn(task)
}

/// An open modem with its keepalive and receive loops running.
///
/// Commands can be issued from any thread, directly or through a cloned
/// [`Commander`]. Decoded frames go to the [`FrameSink`] given at open time.
/// Dropping the device closes it.
pub struct Device {
    name: String,
    commands: Commander,
    shutdown: ShutdownSignal,
    keepalive: Option<JoinHandle<()>>,
    receiver: Option<JoinHandle<()>>,
}

impl Device {
    /// Open a serial port and start the background loops.
    pub fn open(port: &str, config: DeviceConfig, sink: impl FrameSink) -> Result<Self> {
        let link = SerialLink::open(port, &config.serial)?;
        let reader = link.try_clone()?;
        Self::spawn(port.to_string(), reader, link, config, sink)
    }

    /// Start the background loops over an already open transport.
    ///
    /// The reader is owned by the receive thread. It should return
    /// `TimedOut` or `WouldBlock` periodically when idle, otherwise
    /// [`close`](Self::close) waits for the next byte to arrive. A read that
    /// returns `Ok(0)` is end-of-stream: the receive loop stops and the
    /// device stops running, so an idle reader must not report zero bytes.
    pub fn start<R, W>(
        reader: R,
        writer: W,
        config: DeviceConfig,
        sink: impl FrameSink,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::spawn("stream".to_string(), reader, writer, config, sink)
    }

    fn spawn<R, W>(
        name: String,
        reader: R,
        writer: W,
        config: DeviceConfig,
        sink: impl FrameSink,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self::spawn_with(name, reader, writer, config, sink, spawn_thread)
    }

    /// Start both loops through `spawner`.
    ///
    /// If the receive thread cannot be started, the already running
    /// keepalive thread is stopped and joined and both transport halves are
    /// dropped before the error is returned.
    fn spawn_with<R, W>(
        name: String,
        reader: R,
        writer: W,
        config: DeviceConfig,
        sink: impl FrameSink,
        mut spawner: impl FnMut(&'static str, Task) -> io::Result<JoinHandle<()>>,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let commands = Commander::new(TransmitGate::new(writer));
        let shutdown = ShutdownSignal::new();

        let keepalive = {
            let commands = commands.clone();
            let shutdown = shutdown.clone();
            let settings = KeepaliveSettings::from(&config);
            spawner(
                KEEPALIVE_THREAD,
                Box::new(move || run_keepalive(commands, shutdown, settings)),
            )
            .map_err(|source| DeviceError::Spawn {
                task: "keepalive",
                source,
            })?
        };

        let reader = FrameReader::with_config(reader, config.frame);
        let receiver = {
            let shutdown = shutdown.clone();
            spawner(
                RECEIVE_THREAD,
                Box::new(move || run_receive(reader, sink, shutdown)),
            )
        };
        let receiver = match receiver {
            Ok(handle) => handle,
            Err(source) => {
                shutdown.trigger();
                if keepalive.join().is_err() {
                    warn!("keepalive thread panicked");
                }
                commands.gate().close();
                return Err(DeviceError::Spawn {
                    task: "receive",
                    source,
                });
            }
        };

        info!(device = %name, mode = %config.default_mode, "device opened");
        Ok(Self {
            name,
            commands,
            shutdown,
            keepalive: Some(keepalive),
            receiver: Some(receiver),
        })
    }

    /// Stop both loops and release the transport.
    ///
    /// Joins the receive thread, then the keepalive thread, then drops the
    /// transmit half. No reads or writes happen on the transport after this
    /// returns. Calling it again does nothing.
    pub fn close(&mut self) {
        self.shutdown.trigger();

        if let Some(handle) = self.receiver.take() {
            if handle.join().is_err() {
                warn!(device = %self.name, "receive thread panicked");
            }
        }
        if let Some(handle) = self.keepalive.take() {
            if handle.join().is_err() {
                warn!(device = %self.name, "keepalive thread panicked");
            }
        }

        if self.commands.gate().close() {
            info!(device = %self.name, "device closed");
        }
    }

    /// False once the device is closed or the receive loop hit a fatal error.
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_triggered()
    }

    /// Port name, or `"stream"` for devices built with [`start`](Self::start).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared command API. Clone it to issue commands from other threads.
    pub fn commands(&self) -> &Commander {
        &self.commands
    }

    pub fn set_frequency(&self, hz: u32) -> Result<()> {
        self.commands.set_frequency(hz)
    }

    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.commands.set_mode(mode)
    }

    pub fn set_tx_power(&self, level: i32) -> Result<()> {
        self.commands.set_tx_power(level)
    }

    pub fn request_watchdog(&self) -> Result<()> {
        self.commands.request_watchdog()
    }

    pub fn request_receive(&self) -> Result<()> {
        self.commands.request_receive()
    }

    pub fn flush(&self) -> Result<()> {
        self.commands.flush()
    }

    pub fn transmit(&self, data: &[u8]) -> Result<()> {
        self.commands.transmit(data)
    }

    pub fn set_green_led(&self, on: bool) -> Result<()> {
        self.commands.set_green_led(on)
    }

    pub fn request_version(&self) -> Result<()> {
        self.commands.request_version()
    }

    pub fn send_raw(&self, command: u8, payload: &[u8]) -> Result<()> {
        self.commands.send_raw(command, payload)
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}
